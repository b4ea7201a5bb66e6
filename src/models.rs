//! Core data types for the entry hierarchy.
//!
//! A single [`Entry`] type represents both folders and files. Entries form a
//! forest: every entry has at most one parent, and entries without a parent
//! are the top-level ("main") navigation targets.

use serde::Serialize;

/// Discriminates folder entries from file entries. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Folder,
    File,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Folder => "folder",
            EntryType::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<EntryType> {
        match s {
            "folder" => Some(EntryType::Folder),
            "file" => Some(EntryType::File),
            _ => None,
        }
    }
}

/// A node in the hierarchy as stored in the `entries` table.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub filename: String,
    pub entry_type: EntryType,
    pub file_type: Option<String>,
    pub content: Option<String>,
    pub position_marker: Option<i64>,
    pub level: i64,
}

/// One step of a breadcrumb trail, ordered root-first.
#[derive(Debug, Clone, Serialize)]
pub struct Crumb {
    pub id: i64,
    pub filename: String,
    pub level: i64,
}

/// A node of the reconstructed site map (folder entries only).
#[derive(Debug, Clone, Serialize)]
pub struct SiteMapNode {
    pub id: i64,
    pub display_name: String,
    pub parent_id: Option<i64>,
    pub level: i64,
    pub children: Vec<SiteMapNode>,
}

/// A link to an adjacent sibling folder.
#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub id: i64,
    pub label: String,
}

/// Previous/next sibling folders for an entry, absent at the boundaries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiblingNav {
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// A child entry as served to clients, with content already rendered to
/// markup by the serving-boundary renderer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedEntry {
    pub id: i64,
    pub filename: String,
    pub entry_type: EntryType,
    pub file_type: Option<String>,
    pub content: Option<String>,
    pub position_marker: Option<i64>,
}

/// Children of a folder partitioned by kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategorizedEntries {
    pub folders: Vec<RenderedEntry>,
    pub images: Vec<RenderedEntry>,
    pub audio: Vec<RenderedEntry>,
    pub videos: Vec<RenderedEntry>,
    pub text: Vec<RenderedEntry>,
    pub other: Vec<RenderedEntry>,
}

/// Summary of the folder row returned alongside its categorized children.
#[derive(Debug, Clone, Serialize)]
pub struct FolderSummary {
    pub id: i64,
    pub filename: String,
    pub content: Option<String>,
}

/// Result of the entry-details operation. `folder` is `None` when the id
/// does not resolve to a folder entry; the categories are then all empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryDetails {
    pub folder: Option<FolderSummary>,
    pub entries: CategorizedEntries,
}

/// Raw entry as handed to the edit form: unrendered content.
#[derive(Debug, Clone, Serialize)]
pub struct EditEntry {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub filename: String,
    pub content: Option<String>,
}
