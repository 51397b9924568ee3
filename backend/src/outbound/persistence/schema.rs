//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation. When a
//! migration changes the schema, update this file to match (or regenerate
//! it with `diesel print-schema`).

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login email.
        email -> Varchar,
        /// Salted password digest, `<salt-hex>$<digest-hex>`.
        password_hash -> Varchar,
        /// Capability level: `user` or `admin`.
        role -> Varchar,
        /// Registration timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sweet catalog records.
    sweets (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Category label.
        category -> Varchar,
        /// Unit price; non-negative, enforced by a check constraint.
        price -> Float8,
        /// Stock level; non-negative, enforced by a check constraint.
        quantity -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bearer sessions keyed by token fingerprint.
    sessions (token_digest) {
        /// Primary key: SHA-256 hex fingerprint of the bearer token.
        token_digest -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Role claim captured at issue time.
        role -> Varchar,
        /// Issue timestamp.
        issued_at -> Timestamptz,
        /// Expiry timestamp.
        expires_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of stock movements.
    stock_movements (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Sweet the movement applies to.
        sweet_id -> Uuid,
        /// Movement direction: `purchase` or `restock`.
        kind -> Varchar,
        /// Units moved; positive.
        amount -> Int8,
        /// Stock level immediately after the movement.
        quantity_after -> Int8,
        /// When the movement was applied.
        recorded_at -> Timestamptz,
    }
}
