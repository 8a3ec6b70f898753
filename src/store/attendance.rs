use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceWithUser};
use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;

const RECORD_COLUMNS: &str =
    "id, user_id, date, clock_in_time, clock_out_time, status, location_verified";

fn time_text(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// The user's row for `date`, whatever its status.
pub async fn find_for_day(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE user_id = ? AND date = ?"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await
}

/// The user's row for `date` only if it is currently clocked in.
pub async fn find_clocked_in_for_day(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE user_id = ? AND date = ? AND status = ?"
    ))
    .bind(user_id)
    .bind(date)
    .bind(AttendanceStatus::ClockedIn.to_string())
    .fetch_optional(pool)
    .await
}

/// Inserts a clocked-in row and returns its id.
pub async fn insert_clock_in(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
    time: NaiveTime,
    location_verified: bool,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, clock_in_time, status, location_verified)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(time_text(time))
    .bind(AttendanceStatus::ClockedIn.to_string())
    .bind(location_verified)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Clocks in an existing row (e.g. one pre-marked absent). Rows that already
/// carry a clock-in time are left alone; the caller sees 0 rows affected.
pub async fn update_clock_in(
    pool: &SqlitePool,
    id: i64,
    time: NaiveTime,
    location_verified: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET clock_in_time = ?, status = ?, location_verified = ?
        WHERE id = ? AND clock_in_time IS NULL
        "#,
    )
    .bind(time_text(time))
    .bind(AttendanceStatus::ClockedIn.to_string())
    .bind(location_verified)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Only a `ClockedIn` row moves to `Present`; anything else affects 0 rows.
pub async fn update_clock_out(pool: &SqlitePool, id: i64, time: NaiveTime) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out_time = ?, status = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(time_text(time))
    .bind(AttendanceStatus::Present.to_string())
    .bind(id)
    .bind(AttendanceStatus::ClockedIn.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Newest day first.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM attendance WHERE user_id = ? ORDER BY date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Every record with its owner, newest day first, then by name.
pub async fn list_all_with_users(pool: &SqlitePool) -> Result<Vec<AttendanceWithUser>, sqlx::Error> {
    sqlx::query_as::<_, AttendanceWithUser>(
        r#"
        SELECT a.id, a.user_id, a.date, a.clock_in_time, a.clock_out_time, a.status,
               a.location_verified, u.name AS user_name, u.email AS user_email
        FROM attendance a
        JOIN users u ON a.user_id = u.id
        ORDER BY a.date DESC, u.name ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_unique_violation;
    use crate::test_support::{seed_absent, seed_user, test_pool};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap()
    }

    #[actix_web::test]
    async fn clock_in_row_reads_back() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Jane", "jane@example.com").await;

        let id = insert_clock_in(&pool, user.id, day("2024-07-20"), at("08:30:00"), true)
            .await
            .unwrap();
        let record = find_by_id(&pool, id).await.unwrap().unwrap();

        assert_eq!(record.user_id, user.id);
        assert_eq!(record.date, day("2024-07-20"));
        assert_eq!(record.clock_in_time, Some(at("08:30:00")));
        assert_eq!(record.clock_out_time, None);
        assert_eq!(record.status, AttendanceStatus::ClockedIn);
        assert!(record.location_verified);
    }

    #[actix_web::test]
    async fn second_row_for_the_same_day_violates_uniqueness() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Jane", "jane@example.com").await;
        insert_clock_in(&pool, user.id, day("2024-07-20"), at("08:30:00"), false)
            .await
            .unwrap();

        let err = insert_clock_in(&pool, user.id, day("2024-07-20"), at("09:00:00"), false)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[actix_web::test]
    async fn clocked_in_lookup_ignores_other_statuses() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Jane", "jane@example.com").await;
        seed_absent(&pool, user.id, "2024-07-20").await;

        assert!(find_for_day(&pool, user.id, day("2024-07-20")).await.unwrap().is_some());
        assert!(
            find_clocked_in_for_day(&pool, user.id, day("2024-07-20"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn clock_out_keeps_clock_in_time() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Jane", "jane@example.com").await;
        let id = insert_clock_in(&pool, user.id, day("2024-07-20"), at("08:30:00"), true)
            .await
            .unwrap();

        assert_eq!(update_clock_out(&pool, id, at("17:00:00")).await.unwrap(), 1);

        let record = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.clock_in_time, Some(at("08:30:00")));
        assert_eq!(record.clock_out_time, Some(at("17:00:00")));
    }

    #[actix_web::test]
    async fn updates_skip_rows_in_the_wrong_state() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "Jane", "jane@example.com").await;
        let absent = seed_absent(&pool, user.id, "2024-07-20").await;

        // an absent row has nothing to clock out of
        assert_eq!(update_clock_out(&pool, absent, at("17:00:00")).await.unwrap(), 0);

        assert_eq!(update_clock_in(&pool, absent, at("08:30:00"), true).await.unwrap(), 1);
        assert_eq!(update_clock_in(&pool, absent, at("09:00:00"), false).await.unwrap(), 0);

        assert_eq!(update_clock_out(&pool, absent, at("17:00:00")).await.unwrap(), 1);
        assert_eq!(update_clock_out(&pool, absent, at("18:00:00")).await.unwrap(), 0);

        let record = find_by_id(&pool, absent).await.unwrap().unwrap();
        assert_eq!(record.clock_in_time, Some(at("08:30:00")));
        assert_eq!(record.clock_out_time, Some(at("17:00:00")));
        assert!(record.location_verified);
    }

    #[actix_web::test]
    async fn listings_are_ordered() {
        let pool = test_pool().await;
        let zed = seed_user(&pool, "Zed", "zed@example.com").await;
        let amy = seed_user(&pool, "Amy", "amy@example.com").await;

        insert_clock_in(&pool, zed.id, day("2024-07-19"), at("08:00:00"), true)
            .await
            .unwrap();
        insert_clock_in(&pool, zed.id, day("2024-07-20"), at("08:00:00"), true)
            .await
            .unwrap();
        insert_clock_in(&pool, amy.id, day("2024-07-20"), at("09:00:00"), false)
            .await
            .unwrap();

        let mine = list_for_user(&pool, zed.id).await.unwrap();
        let dates: Vec<String> = mine.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2024-07-20", "2024-07-19"]);

        let all = list_all_with_users(&pool).await.unwrap();
        let order: Vec<(String, String)> = all
            .iter()
            .map(|r| (r.record.date.to_string(), r.user_name.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2024-07-20".to_string(), "Amy".to_string()),
                ("2024-07-20".to_string(), "Zed".to_string()),
                ("2024-07-19".to_string(), "Zed".to_string()),
            ]
        );
        assert_eq!(all[0].user_email, "amy@example.com");
        assert!(!all[0].record.location_verified);
    }
}
