//! SQLite schema definition.

/// Complete database schema for hemotrack.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Locations
-- ============================================================================

CREATE TABLE IF NOT EXISTS locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT,
    phone TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Guarantee a facility exists before the first registration
INSERT INTO locations (name, address, phone)
SELECT 'Main Hospital', '123 Healthcare Street, Medical City', '+1234567890'
WHERE NOT EXISTS (SELECT 1 FROM locations);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    patient_id TEXT PRIMARY KEY,                 -- 'PAT' + 6-digit suffix
    name TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,
    gender TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT,
    address TEXT,
    emergency_contact TEXT,
    registration_location_id INTEGER NOT NULL REFERENCES locations(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Health Records (Append-Only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS health_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id TEXT NOT NULL REFERENCES patients(patient_id),
    location_id INTEGER NOT NULL REFERENCES locations(id),
    height_cm REAL,
    weight_kg REAL,
    temperature_c REAL,
    blood_pressure_systolic INTEGER,
    blood_pressure_diastolic INTEGER,
    heart_rate INTEGER,
    notes TEXT,
    recorded_by TEXT NOT NULL,
    recorded_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_health_records_patient ON health_records(patient_id);

-- ============================================================================
-- Blood Samples (Append-Only Lifecycle - rows are never deleted)
-- ============================================================================

CREATE TABLE IF NOT EXISTS blood_samples (
    sample_id TEXT PRIMARY KEY,                  -- 'BS' + 6-digit suffix
    patient_id TEXT NOT NULL REFERENCES patients(patient_id),
    collection_location_id INTEGER NOT NULL REFERENCES locations(id),
    test_type TEXT NOT NULL,
    collector_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'collected'
        CHECK (status IN ('collected', 'tested', 'results_sent')),
    results TEXT,
    test_location_id INTEGER REFERENCES locations(id),
    technician_name TEXT,
    tested_at TEXT,
    notification_sent_at TEXT,
    collected_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_samples_patient ON blood_samples(patient_id);
CREATE INDEX IF NOT EXISTS idx_samples_status ON blood_samples(status);

-- Test fields travel with the status they belong to
CREATE TRIGGER IF NOT EXISTS blood_samples_check_collected BEFORE INSERT ON blood_samples
WHEN new.status = 'collected'
BEGIN
    SELECT CASE
        WHEN new.results IS NOT NULL OR new.technician_name IS NOT NULL
             OR new.test_location_id IS NOT NULL OR new.tested_at IS NOT NULL THEN
            RAISE(ABORT, 'Collected samples cannot carry test results')
        WHEN new.notification_sent_at IS NOT NULL THEN
            RAISE(ABORT, 'Collected samples cannot carry a notification timestamp')
    END;
END;

CREATE TRIGGER IF NOT EXISTS blood_samples_check_tested BEFORE INSERT ON blood_samples
WHEN new.status = 'tested'
BEGIN
    SELECT CASE
        WHEN new.results IS NULL OR new.technician_name IS NULL
             OR new.test_location_id IS NULL OR new.tested_at IS NULL THEN
            RAISE(ABORT, 'Tested samples must carry complete test results')
        WHEN new.notification_sent_at IS NOT NULL THEN
            RAISE(ABORT, 'Tested samples cannot carry a notification timestamp')
    END;
END;

-- ============================================================================
-- Notifications (Dispatch Audit Log)
-- ============================================================================

CREATE TABLE IF NOT EXISTS notifications (
    message_ref TEXT PRIMARY KEY,                -- idempotency key (UUID)
    sample_id TEXT NOT NULL REFERENCES blood_samples(sample_id),
    recipient TEXT NOT NULL,
    outcome TEXT NOT NULL
        CHECK (outcome IN ('sent', 'already_sent', 'failed')),
    error TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_notifications_sample ON notifications(sample_id);
"#;
