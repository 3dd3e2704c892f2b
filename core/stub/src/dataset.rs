// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Read-only sample data backing the query operations.
//!
//! A [`Dataset`] is built once, validated, and then only ever read. The
//! service shares it behind an `Arc`, so concurrent calls need no locking.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use crate::api::v1;
use crate::errors::FixtureError;

/// Progress of thumbnail generation for a disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbState {
    Waiting,
    Working,
    Error,
    Done,
}

impl ThumbState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbState::Waiting => "waiting",
            ThumbState::Working => "working",
            ThumbState::Error => "error",
            ThumbState::Done => "done",
        }
    }
}

impl fmt::Display for ThumbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscFile {
    pub file: String,
    #[serde(default)]
    pub category: Option<String>,
    pub thumb: String,
    pub human_size: String,
    pub human_duration: String,
    #[serde(default)]
    pub num_chapters: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Disc {
    pub name: String,
    pub thumb_state: ThumbState,
    #[serde(default)]
    pub files: Vec<DiscFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub discs: Vec<Disc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieMetadata {
    pub title: String,
    pub original_title: String,
    pub release_date: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub overview: String,
}

impl MovieMetadata {
    /// Whether this record matches a movie search for `needle`, which must
    /// already be lowercased.
    ///
    /// The title is lowercased before comparing, the original title is
    /// compared as stored.
    // TODO: confirm with the API owners whether the original title should be
    // lowercased too; today "Original" never matches "Original Movie 1".
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.original_title.contains(needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    projects: Vec<Project>,
    unclaimed: Vec<String>,
    metadata: Vec<MovieMetadata>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate project names.
    pub fn new(
        projects: Vec<Project>,
        unclaimed: Vec<String>,
        metadata: Vec<MovieMetadata>,
    ) -> Result<Self, FixtureError> {
        let mut seen = HashSet::with_capacity(projects.len());
        for project in &projects {
            if !seen.insert(project.name.as_str()) {
                return Err(FixtureError::DuplicateProject(project.name.clone()));
            }
        }

        Ok(Dataset::from_parts(projects, unclaimed, metadata))
    }

    /// Build a dataset whose project names are known to be unique.
    pub(crate) fn from_parts(
        projects: Vec<Project>,
        unclaimed: Vec<String>,
        metadata: Vec<MovieMetadata>,
    ) -> Self {
        Dataset {
            projects,
            unclaimed,
            metadata,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Project names in dataset order.
    pub fn project_names(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|p| p.name.as_str())
    }

    pub fn find_project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn unclaimed(&self) -> &[String] {
        &self.unclaimed
    }

    pub fn metadata(&self) -> &[MovieMetadata] {
        &self.metadata
    }

    /// Metadata records matching a partial title, in dataset order. An empty
    /// partial title matches every record.
    pub fn find_metadata(&self, partial_title: &str) -> impl Iterator<Item = &MovieMetadata> {
        let needle = partial_title.to_lowercase();
        self.metadata.iter().filter(move |m| m.matches(&needle))
    }
}

impl From<&DiscFile> for v1::DiscFile {
    fn from(file: &DiscFile) -> Self {
        v1::DiscFile {
            file: file.file.clone(),
            category: file.category.clone(),
            thumb: file.thumb.clone(),
            human_size: file.human_size.clone(),
            human_duration: file.human_duration.clone(),
            num_chapters: file.num_chapters,
        }
    }
}

impl From<&Disc> for v1::ProjectDisc {
    fn from(disc: &Disc) -> Self {
        v1::ProjectDisc {
            disc: disc.name.clone(),
            thumb_state: disc.thumb_state.to_string(),
            disc_files: disc.files.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Project> for v1::ProjectGetResponse {
    fn from(project: &Project) -> Self {
        v1::ProjectGetResponse {
            project: project.name.clone(),
            discs: project.discs.iter().map(Into::into).collect(),
        }
    }
}

impl From<&MovieMetadata> for v1::MovieSearchResult {
    fn from(metadata: &MovieMetadata) -> Self {
        v1::MovieSearchResult {
            title: metadata.title.clone(),
            original_title: metadata.original_title.clone(),
            release_date: metadata.release_date.clone(),
            genres: metadata.genres.clone(),
            overview: metadata.overview.clone(),
        }
    }
}
