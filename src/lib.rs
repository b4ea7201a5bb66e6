//! # Waypost
//!
//! A hierarchical document store and browser for directory-based
//! rich-text content.
//!
//! Waypost imports a directory tree of documents into a single SQLite
//! table of parent-linked entries (a forest, not necessarily one tree),
//! then serves the hierarchy as browsable, editable content: breadcrumb
//! trails, position-ordered sibling navigation, a reconstructed site map,
//! and categorized folder listings.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Directory  │──▶│ Tree Builder │──▶│  SQLite   │
//! │   walk     │   │  (import)    │   │ entries   │
//! └────────────┘   └──────────────┘   └────┬─────┘
//!                                          │
//!                      ┌───────────────────┤
//!                      ▼                   ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   CLI    │       │   HTTP   │
//!                 │(waypost) │       │  (JSON)  │
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! waypost init                  # create database
//! waypost import                # ingest the configured directory tree
//! waypost tree                  # print the site map
//! waypost get 3                 # inspect one entry
//! waypost serve                 # start the JSON HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`import`] | Tree Builder: directory walk into the store |
//! | [`navigator`] | Breadcrumbs, sibling nav, site map, details, update |
//! | [`decode`] | Charset detection and RTF-to-text decoding |
//! | [`render`] | Markdown rendering at the serving boundary |
//! | [`server`] | JSON HTTP server |
//! | [`show`] | CLI views |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod config;
pub mod db;
pub mod decode;
pub mod import;
pub mod migrate;
pub mod models;
pub mod navigator;
pub mod render;
pub mod server;
pub mod show;
