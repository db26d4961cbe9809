pub const INSERT_PROFILE: &str = r#"
INSERT INTO profiles (id, user_id, name, nationality, phone, emergency_contact, kyc_document_number, profile_image_url, role, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11);
"#;

pub const SELECT_PROFILE_BY_USER: &str = r#"
SELECT * FROM profiles WHERE user_id = $1 LIMIT 1;
"#;

pub const SELECT_PROFILES_BY_ROLE: &str = r#"
SELECT * FROM profiles WHERE role = $1 ORDER BY created_at DESC;
"#;

pub const INSERT_DIGITAL_ID: &str = r#"
INSERT INTO digital_tourist_ids (id, user_id, digital_id, blockchain_hash, expiry_date, itinerary, qr_code_url, status, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
"#;

pub const SELECT_DIGITAL_ID_BY_USER: &str = r#"
SELECT * FROM digital_tourist_ids WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1;
"#;

pub const SELECT_DIGITAL_ID_BY_CODE: &str = r#"
SELECT * FROM digital_tourist_ids WHERE digital_id = $1 LIMIT 1;
"#;

pub const SELECT_DIGITAL_IDS: &str = r#"
SELECT * FROM digital_tourist_ids ORDER BY created_at DESC;
"#;

pub const INSERT_SOS_ALERT: &str = r#"
INSERT INTO sos_alerts (
    id, user_id, digital_id, location, alert_type, severity, status, notes, response_time, resolved_at, created_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11);
"#;

pub const INSERT_E_FIR_REPORT: &str = r#"
INSERT INTO e_fir_reports (
    id, sos_alert_id, fir_number, blockchain_hash, police_station, officer_assigned, incident_details, status, pdf_url, created_at
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
"#;

pub const SELECT_SOS_ALERT: &str = r#"
SELECT * FROM sos_alerts WHERE id = $1;
"#;

pub const SELECT_RECENT_SOS_ALERTS: &str = r#"
SELECT * FROM sos_alerts ORDER BY created_at DESC LIMIT $1;
"#;

pub const UPDATE_SOS_ALERT_STATUS: &str = r#"
UPDATE sos_alerts
SET status = $2,
    response_time = $3,
    resolved_at = $4
WHERE id = $1;
"#;

pub const APPEND_SOS_ALERT_NOTE: &str = r#"
UPDATE sos_alerts
SET notes = COALESCE(NULLIF(notes, '') || E'\n', '') || $2
WHERE id = $1
RETURNING *;
"#;

pub const SELECT_E_FIR_REPORTS: &str = r#"
SELECT * FROM e_fir_reports ORDER BY created_at DESC;
"#;

pub const SELECT_E_FIR_REPORTS_FOR_USER: &str = r#"
SELECT r.*
FROM e_fir_reports r
JOIN sos_alerts a ON a.id = r.sos_alert_id
WHERE a.user_id = $1
ORDER BY r.created_at DESC;
"#;

pub const SELECT_DANGER_ZONES: &str = r#"
SELECT * FROM danger_zones WHERE ($1 = false OR active IS NOT FALSE) ORDER BY created_at DESC;
"#;

pub const INSERT_DANGER_ZONE: &str = r#"
INSERT INTO danger_zones (id, name, description, coordinates, risk_level, active, created_by, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
"#;
