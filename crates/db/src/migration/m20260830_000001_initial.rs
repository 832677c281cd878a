//! Initial database migration.
//!
//! Creates the control-plane enums, tables, constraints, and RLS policies.
//! The database backs up the core policy rules with its own constraints:
//! the one-open-period rule, lock range exclusion, and the justification
//! length floor all hold even if application code is bypassed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTING PERIODS
        // ============================================================
        db.execute_unprepared(ACCOUNTING_PERIODS_SQL).await?;

        // ============================================================
        // PART 3: LEDGER LOCKS
        // ============================================================
        db.execute_unprepared(LEDGER_LOCKS_SQL).await?;

        // ============================================================
        // PART 4: SETTLEMENTS
        // ============================================================
        db.execute_unprepared(SETTLEMENTS_SQL).await?;
        db.execute_unprepared(SETTLEMENT_TRANSITIONS_SQL).await?;

        // ============================================================
        // PART 5: OVERRIDE LOG
        // ============================================================
        db.execute_unprepared(OVERRIDE_LOG_SQL).await?;

        // ============================================================
        // PART 6: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Accounting period lifecycle
CREATE TYPE period_status AS ENUM (
    'open',
    'soft_closed',
    'hard_closed'
);

-- Accounting period granularity
CREATE TYPE period_type AS ENUM (
    'daily',
    'monthly'
);

-- Ledger lock kinds
CREATE TYPE lock_type AS ENUM (
    'period_lock',
    'audit_lock',
    'reconciliation_lock'
);

CREATE TYPE lock_status AS ENUM (
    'active',
    'released'
);

-- Settlement lifecycle
CREATE TYPE settlement_status AS ENUM (
    'created',
    'funds_reserved',
    'sent_to_bank',
    'bank_confirmed',
    'settled',
    'failed',
    'retried'
);

-- Override audit
CREATE TYPE override_type AS ENUM (
    'soft_closed_posting',
    'lock_release'
);

CREATE TYPE user_role AS ENUM (
    'viewer',
    'operator',
    'finance_admin'
);

-- Exclusion constraints over date ranges need btree_gist
CREATE EXTENSION IF NOT EXISTS btree_gist;
";

const ACCOUNTING_PERIODS_SQL: &str = r"
CREATE TABLE accounting_periods (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    period_type period_type NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    status period_status NOT NULL DEFAULT 'open',
    closed_by UUID,
    closed_at TIMESTAMPTZ,
    closure_notes TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_period_dates CHECK (period_start <= period_end),
    CONSTRAINT chk_period_closed_fields CHECK (
        (status = 'open' AND closed_by IS NULL AND closed_at IS NULL)
        OR status <> 'open'
    )
);

-- At most one open period per tenant and granularity
CREATE UNIQUE INDEX uq_one_open_period
    ON accounting_periods (tenant_id, period_type)
    WHERE status = 'open';

-- Periods of the same granularity never overlap
ALTER TABLE accounting_periods
    ADD CONSTRAINT excl_period_overlap
    EXCLUDE USING gist (
        tenant_id WITH =,
        period_type WITH =,
        daterange(period_start, period_end, '[]') WITH &&
    );

CREATE INDEX idx_periods_tenant_dates
    ON accounting_periods (tenant_id, period_start, period_end);
";

const LEDGER_LOCKS_SQL: &str = r"
CREATE TABLE ledger_locks (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    lock_type lock_type NOT NULL,
    lock_start_date DATE NOT NULL,
    lock_end_date DATE NOT NULL,
    lock_status lock_status NOT NULL DEFAULT 'active',
    reason TEXT NOT NULL,
    reference_number TEXT,
    accounting_period_id UUID REFERENCES accounting_periods(id),
    locked_by UUID NOT NULL,
    locked_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    released_by UUID,
    released_at TIMESTAMPTZ,

    CONSTRAINT chk_lock_dates CHECK (lock_start_date <= lock_end_date),
    CONSTRAINT chk_lock_reason CHECK (length(trim(reason)) > 0),
    CONSTRAINT chk_lock_released_fields CHECK (
        (lock_status = 'active' AND released_by IS NULL AND released_at IS NULL)
        OR (lock_status = 'released' AND released_by IS NOT NULL AND released_at IS NOT NULL)
    )
);

-- Active lock ranges never overlap, regardless of lock type
ALTER TABLE ledger_locks
    ADD CONSTRAINT excl_active_lock_overlap
    EXCLUDE USING gist (
        tenant_id WITH =,
        daterange(lock_start_date, lock_end_date, '[]') WITH &&
    )
    WHERE (lock_status = 'active');

CREATE INDEX idx_locks_tenant_status
    ON ledger_locks (tenant_id, lock_status);
";

const SETTLEMENTS_SQL: &str = r"
CREATE TABLE settlements (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    settlement_ref TEXT NOT NULL,
    merchant_id UUID NOT NULL,
    net_amount NUMERIC(19, 4) NOT NULL,
    status settlement_status NOT NULL DEFAULT 'created',
    retry_count INTEGER NOT NULL DEFAULT 0,
    max_retries INTEGER NOT NULL DEFAULT 3,
    next_retry_at TIMESTAMPTZ,
    last_retry_at TIMESTAMPTZ,
    failure_reason TEXT,
    utr_number TEXT,
    bank_reference_number TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_settlement_ref UNIQUE (tenant_id, settlement_ref),
    CONSTRAINT chk_retry_count CHECK (retry_count >= 0 AND retry_count <= max_retries),
    CONSTRAINT chk_confirmed_has_utr CHECK (
        status NOT IN ('bank_confirmed', 'settled') OR utr_number IS NOT NULL
    )
);

CREATE INDEX idx_settlements_tenant_status
    ON settlements (tenant_id, status);

-- Retry queue scan
CREATE INDEX idx_settlements_retry_due
    ON settlements (next_retry_at)
    WHERE status = 'retried';
";

const SETTLEMENT_TRANSITIONS_SQL: &str = r"
CREATE TABLE settlement_transitions (
    id UUID PRIMARY KEY,
    settlement_id UUID NOT NULL REFERENCES settlements(id),
    tenant_id UUID NOT NULL,
    from_status settlement_status NOT NULL,
    to_status settlement_status NOT NULL,
    transitioned_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    transitioned_by UUID NOT NULL
);

CREATE INDEX idx_transitions_settlement
    ON settlement_transitions (settlement_id, transitioned_at);
";

const OVERRIDE_LOG_SQL: &str = r"
CREATE TABLE override_log (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    override_type override_type NOT NULL,
    justification TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id UUID NOT NULL,
    affected_entities JSONB NOT NULL DEFAULT '[]',
    override_by UUID NOT NULL,
    override_by_role user_role NOT NULL,
    approved_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_justification_length CHECK (length(trim(justification)) >= 10)
);

CREATE INDEX idx_override_log_tenant
    ON override_log (tenant_id, created_at);
CREATE INDEX idx_override_log_entity
    ON override_log (entity_type, entity_id);

-- The log is append-only; nothing updates or deletes audit rows
CREATE RULE override_log_no_update AS ON UPDATE TO override_log DO INSTEAD NOTHING;
CREATE RULE override_log_no_delete AS ON DELETE TO override_log DO INSTEAD NOTHING;
";

const RLS_SQL: &str = r"
ALTER TABLE accounting_periods ENABLE ROW LEVEL SECURITY;
ALTER TABLE ledger_locks ENABLE ROW LEVEL SECURITY;
ALTER TABLE settlements ENABLE ROW LEVEL SECURITY;
ALTER TABLE settlement_transitions ENABLE ROW LEVEL SECURITY;
ALTER TABLE override_log ENABLE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation_periods ON accounting_periods
    USING (tenant_id = current_setting('app.current_tenant_id')::uuid);
CREATE POLICY tenant_isolation_locks ON ledger_locks
    USING (tenant_id = current_setting('app.current_tenant_id')::uuid);
CREATE POLICY tenant_isolation_settlements ON settlements
    USING (tenant_id = current_setting('app.current_tenant_id')::uuid);
CREATE POLICY tenant_isolation_transitions ON settlement_transitions
    USING (tenant_id = current_setting('app.current_tenant_id')::uuid);
CREATE POLICY tenant_isolation_override_log ON override_log
    USING (tenant_id = current_setting('app.current_tenant_id')::uuid);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS settlement_transitions;
DROP TABLE IF EXISTS settlements;
DROP TABLE IF EXISTS override_log;
DROP TABLE IF EXISTS ledger_locks;
DROP TABLE IF EXISTS accounting_periods;

DROP TYPE IF EXISTS user_role;
DROP TYPE IF EXISTS override_type;
DROP TYPE IF EXISTS settlement_status;
DROP TYPE IF EXISTS lock_status;
DROP TYPE IF EXISTS lock_type;
DROP TYPE IF EXISTS period_type;
DROP TYPE IF EXISTS period_status;
";
