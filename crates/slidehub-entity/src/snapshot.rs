//! Row snapshots captured by undoable commands.
//!
//! Delete and merge commands capture the affected rows before mutating so
//! that `revert()` can restore them without re-querying state that no
//! longer exists.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assembly::{Assembly, AssemblySlide};
use crate::element::Element;
use crate::file::LibraryFile;
use crate::keyword::Keyword;
use crate::project::Project;
use crate::slide::Slide;

/// Everything owned by one file: its row, slides, elements, keyword
/// association edges, and the assembly-ordering rows referencing its
/// slides (those cascade away with the slides on delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSnapshot {
    /// The file row.
    pub file: LibraryFile,
    /// All slides of the file.
    pub slides: Vec<Slide>,
    /// All elements of those slides.
    pub elements: Vec<Element>,
    /// `(slide_id, keyword_id)` association edges.
    pub slide_edges: Vec<(Uuid, Uuid)>,
    /// `(element_id, keyword_id)` association edges.
    pub element_edges: Vec<(Uuid, Uuid)>,
    /// Assembly-ordering rows referencing this file's slides.
    pub assembly_slides: Vec<AssemblySlide>,
}

/// One keyword together with its association edges, captured before a
/// merge removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSnapshot {
    /// The keyword row.
    pub keyword: Keyword,
    /// Slides the keyword was assigned to.
    pub slide_ids: Vec<Uuid>,
    /// Elements the keyword was assigned to.
    pub element_ids: Vec<Uuid>,
}

/// Everything owned by one project, captured before project deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// The project row.
    pub project: Project,
    /// Per-file snapshots.
    pub files: Vec<FileSnapshot>,
    /// All keywords of the project.
    pub keywords: Vec<Keyword>,
    /// All assemblies of the project.
    pub assemblies: Vec<Assembly>,
    /// All assembly ordering rows.
    pub assembly_slides: Vec<AssemblySlide>,
}
