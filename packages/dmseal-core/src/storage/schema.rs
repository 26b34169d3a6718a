//! # Database Schema
//!
//! SQLite schema for the message store adapter.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DATABASE SCHEMA                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐      ┌─────────────────┐                           │
//! │  │  conversations  │      │    messages     │                           │
//! │  ├─────────────────┤      ├─────────────────┤                           │
//! │  │ id              │◄─────│ conversation_id │                           │
//! │  │ participant_a   │      │ id              │                           │
//! │  │ participant_b   │      │ content         │  plaintext or envelope    │
//! │  │ created_at      │      │ media_metadata  │  JSON object              │
//! │  └─────────────────┘      │ timestamp       │                           │
//! │                           └─────────────────┘                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Conversations table
-- Direct-message conversations between exactly two participants
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    -- Participant identifiers, stored in the order they were given
    participant_a TEXT NOT NULL,
    participant_b TEXT NOT NULL,
    -- When the conversation was created (Unix timestamp)
    created_at INTEGER NOT NULL
);

-- Messages table
-- Content is legacy plaintext or an ENC:v1 envelope
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    -- Which conversation this belongs to
    conversation_id TEXT NOT NULL,
    -- Message text (NULL for media-only messages)
    content TEXT,
    -- Media metadata as a JSON object (NULL if none)
    media_metadata TEXT,
    -- When the message was sent (Unix timestamp ms)
    timestamp INTEGER NOT NULL,
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, timestamp);
"#;
