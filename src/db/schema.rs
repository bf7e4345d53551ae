//! Database Schema
//!
//! SQLite table definitions

/// Schema creation SQL (idempotent)
pub const CREATE_SCHEMA: &str = r#"
-- Login identities
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'consultor' CHECK (role IN ('admin', 'consultor'))
);

-- Clients
CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    profession TEXT NOT NULL,
    age INTEGER NOT NULL,
    disc_type TEXT NOT NULL CHECK (disc_type IN ('D', 'I', 'S', 'C'))
);

CREATE INDEX IF NOT EXISTS idx_clients_email ON clients(email);

-- Candidate profiles (legacy runner intake)
CREATE TABLE IF NOT EXISTS candidate_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL,
    location TEXT NOT NULL,
    disc_type TEXT NOT NULL CHECK (disc_type IN ('D', 'I', 'S', 'C')),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_candidate_profiles_email ON candidate_profiles(email);

CREATE TABLE IF NOT EXISTS relevant_positions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    candidate_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    sector TEXT NOT NULL,
    score REAL NOT NULL,
    FOREIGN KEY (candidate_id) REFERENCES candidate_profiles(id)
);

CREATE INDEX IF NOT EXISTS idx_relevant_positions_candidate ON relevant_positions(candidate_id);

-- Generated artifacts. No cascade: deleting a client leaves its documents.
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL,
    module INTEGER NOT NULL CHECK (module BETWEEN 0 AND 3),
    doc_type TEXT NOT NULL,
    path TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    FOREIGN KEY (client_id) REFERENCES clients(id)
);

CREATE INDEX IF NOT EXISTS idx_documents_client ON documents(client_id);
CREATE INDEX IF NOT EXISTS idx_documents_order ON documents(client_id, module, created_at);

-- Structured CVs
CREATE TABLE IF NOT EXISTS cv_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    json_blob TEXT NOT NULL,
    pdf_path TEXT NOT NULL,
    docx_path TEXT NOT NULL,
    FOREIGN KEY (client_id) REFERENCES clients(id)
);

CREATE INDEX IF NOT EXISTS idx_cv_data_client ON cv_data(client_id);
"#;
