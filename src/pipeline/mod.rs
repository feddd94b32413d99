//! Pipeline stages for a MediaWiki-to-DokuWiki import.
//!
//! Each submodule implements exactly one stage. Keeping stages separate
//! makes each independently testable and keeps the syntax converter — the
//! only stage with real design content — free of any I/O.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ syntax ──▶ sink
//! (DB rows)  (markup     (data/pages)
//!     │       rewrite)
//!     └─────────────────▶ media
//!       (image rows)      (hashed upload → data/media)
//! ```
//!
//! 1. [`source`] — read `(title, namespace, text)` rows from the wiki's
//!    SQLite database and dispatch them by namespace
//! 2. [`syntax`] — rewrite one page body from MediaWiki to DokuWiki markup;
//!    a pure string pipeline with a call-scoped protected-block store
//! 3. [`sink`]   — write converted pages into the DokuWiki tree (cleaned
//!    ids, atomic writes)
//! 4. [`media`]  — resolve the MD5-hashed upload path and copy image files

pub mod media;
pub mod sink;
pub mod source;
pub mod syntax;
