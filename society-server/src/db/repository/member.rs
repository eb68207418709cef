//! Member Repository

use super::{RepoError, RepoResult};
use shared::models::{Member, MemberUpdate};
use sqlx::SqlitePool;

const MEMBER_SELECT: &str = "SELECT id, seniority_no, name, aadhar_number, application_no, \
    membership_type, date, dob, membership_day, membership_fees, father, birthplace, mobile, \
    alternate_mobile, email, alternate_email, permanent_address, correspondence_address, \
    nominee_name, nominee_number, nominee_age, nominee_relationship, nominee_address, \
    agree_terms_conditions, agree_communication, image, pancard, aadharcard, application_doc, \
    created_at, updated_at FROM member";

/// Uploaded KYC document references stored alongside the member row
#[derive(Debug, Clone, Default)]
pub struct MemberDocs {
    pub image: Option<String>,
    pub pancard: Option<String>,
    pub aadharcard: Option<String>,
    pub application_doc: Option<String>,
}

/// Text fields of a new member, dates already converted to millis
#[derive(Debug, Clone)]
pub struct NewMember {
    pub seniority_no: String,
    pub name: String,
    pub aadhar_number: i64,
    pub application_no: i64,
    pub membership_type: String,
    pub date: i64,
    pub dob: i64,
    pub membership_day: Option<String>,
    pub membership_fees: f64,
    pub father: Option<String>,
    pub birthplace: Option<String>,
    pub mobile: String,
    pub alternate_mobile: Option<String>,
    pub email: Option<String>,
    pub alternate_email: Option<String>,
    pub permanent_address: Option<String>,
    pub correspondence_address: Option<String>,
    pub nominee_name: Option<String>,
    pub nominee_number: Option<String>,
    pub nominee_age: Option<String>,
    pub nominee_relationship: Option<String>,
    pub nominee_address: Option<String>,
    pub agree_terms_conditions: bool,
    pub agree_communication: bool,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Member>> {
    let sql = format!("{MEMBER_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Member>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_seniority(pool: &SqlitePool, seniority_no: &str) -> RepoResult<Option<Member>> {
    let sql = format!("{MEMBER_SELECT} WHERE seniority_no = ?");
    let row = sqlx::query_as::<_, Member>(&sql)
        .bind(seniority_no)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: NewMember, docs: MemberDocs) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO member (id, seniority_no, name, aadhar_number, application_no, \
         membership_type, date, dob, membership_day, membership_fees, father, birthplace, mobile, \
         alternate_mobile, email, alternate_email, permanent_address, correspondence_address, \
         nominee_name, nominee_number, nominee_age, nominee_relationship, nominee_address, \
         agree_terms_conditions, agree_communication, image, pancard, aadharcard, application_doc, \
         created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
         ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?30)",
    )
    .bind(id)
    .bind(&data.seniority_no)
    .bind(&data.name)
    .bind(data.aadhar_number)
    .bind(data.application_no)
    .bind(&data.membership_type)
    .bind(data.date)
    .bind(data.dob)
    .bind(&data.membership_day)
    .bind(data.membership_fees)
    .bind(&data.father)
    .bind(&data.birthplace)
    .bind(&data.mobile)
    .bind(&data.alternate_mobile)
    .bind(&data.email)
    .bind(&data.alternate_email)
    .bind(&data.permanent_address)
    .bind(&data.correspondence_address)
    .bind(&data.nominee_name)
    .bind(&data.nominee_number)
    .bind(&data.nominee_age)
    .bind(&data.nominee_relationship)
    .bind(&data.nominee_address)
    .bind(data.agree_terms_conditions)
    .bind(data.agree_communication)
    .bind(&docs.image)
    .bind(&docs.pancard)
    .bind(&docs.aadharcard)
    .bind(&docs.application_doc)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_seniority(pool, &data.seniority_no)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

/// 更新会员（COALESCE 保留未提交字段；日期在 handler 层转 millis）
pub async fn update(
    pool: &SqlitePool,
    seniority_no: &str,
    data: &MemberUpdate,
    date: Option<i64>,
    dob: Option<i64>,
) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE member SET name = COALESCE(?1, name), aadhar_number = COALESCE(?2, aadhar_number), \
         application_no = COALESCE(?3, application_no), membership_type = COALESCE(?4, membership_type), \
         date = COALESCE(?5, date), dob = COALESCE(?6, dob), membership_day = COALESCE(?7, membership_day), \
         membership_fees = COALESCE(?8, membership_fees), father = COALESCE(?9, father), \
         birthplace = COALESCE(?10, birthplace), mobile = COALESCE(?11, mobile), \
         alternate_mobile = COALESCE(?12, alternate_mobile), email = COALESCE(?13, email), \
         alternate_email = COALESCE(?14, alternate_email), permanent_address = COALESCE(?15, permanent_address), \
         correspondence_address = COALESCE(?16, correspondence_address), nominee_name = COALESCE(?17, nominee_name), \
         nominee_number = COALESCE(?18, nominee_number), nominee_age = COALESCE(?19, nominee_age), \
         nominee_relationship = COALESCE(?20, nominee_relationship), nominee_address = COALESCE(?21, nominee_address), \
         agree_terms_conditions = COALESCE(?22, agree_terms_conditions), \
         agree_communication = COALESCE(?23, agree_communication), updated_at = ?24 \
         WHERE seniority_no = ?25",
    )
    .bind(&data.name)
    .bind(data.aadhar_number)
    .bind(data.application_no)
    .bind(&data.membership_type)
    .bind(date)
    .bind(dob)
    .bind(&data.membership_day)
    .bind(data.membership_fees)
    .bind(&data.father)
    .bind(&data.birthplace)
    .bind(&data.mobile)
    .bind(&data.alternate_mobile)
    .bind(&data.email)
    .bind(&data.alternate_email)
    .bind(&data.permanent_address)
    .bind(&data.correspondence_address)
    .bind(&data.nominee_name)
    .bind(&data.nominee_number)
    .bind(&data.nominee_age)
    .bind(&data.nominee_relationship)
    .bind(&data.nominee_address)
    .bind(data.agree_terms_conditions)
    .bind(data.agree_communication)
    .bind(now)
    .bind(seniority_no)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Member {seniority_no} not found"
        )));
    }
    find_by_seniority(pool, seniority_no)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {seniority_no} not found")))
}

/// 订地记录改名/改编号时同步会员表（propagation from SiteBooking updates）
pub async fn apply_booking_propagation(
    pool: &SqlitePool,
    old_seniority_no: &str,
    new_seniority_no: Option<&str>,
    new_name: Option<&str>,
) -> RepoResult<()> {
    if new_seniority_no.is_none() && new_name.is_none() {
        return Ok(());
    }
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE member SET seniority_no = COALESCE(?1, seniority_no), name = COALESCE(?2, name), \
         updated_at = ?3 WHERE seniority_no = ?4",
    )
    .bind(new_seniority_no)
    .bind(new_name)
    .bind(now)
    .bind(old_seniority_no)
    .execute(pool)
    .await?;
    Ok(())
}
