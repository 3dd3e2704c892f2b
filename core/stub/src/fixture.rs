// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use tracing::debug;

use crate::dataset::{Dataset, Disc, DiscFile, MovieMetadata, Project, ThumbState};
use crate::errors::FixtureError;
use crate::mapping::{MappingTables, greeting};

#[derive(Debug, Deserialize)]
struct Greeting {
    #[serde(default)]
    name: String,
    message: String,
}

/// On-disk layout of a fixture file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    #[serde(default)]
    hello_world: Vec<Greeting>,
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    unclaimed: Vec<String>,
    #[serde(default)]
    metadata: Vec<MovieMetadata>,
}

/// Everything the stub answers from: the dataset and the mapping tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub dataset: Dataset,
    pub tables: MappingTables,
}

impl Fixtures {
    pub fn new(dataset: Dataset, tables: MappingTables) -> Self {
        Fixtures { dataset, tables }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_yaml::from_str(yaml)?;

        let tables = MappingTables {
            hello_world: file
                .hello_world
                .iter()
                .map(|g| greeting(&g.name, &g.message))
                .collect(),
        };
        let dataset = Dataset::new(file.projects, file.unclaimed, file.metadata)?;

        Ok(Fixtures { dataset, tables })
    }

    pub fn load(path: &str) -> Result<Self, FixtureError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_string(),
            source,
        })?;

        let fixtures = Self::from_yaml_str(&yaml)?;
        debug!(
            %path,
            projects = fixtures.dataset.projects().len(),
            greetings = fixtures.tables.hello_world.len(),
            "fixtures loaded"
        );

        Ok(fixtures)
    }

    /// The sample data served when no fixture file is configured.
    pub fn builtin() -> Self {
        let projects = vec![
            Project {
                name: "Empty".to_string(),
                discs: vec![],
            },
            Project {
                name: "Name With Spaces".to_string(),
                discs: vec![
                    thumbless_disc("Disc Waiting Thumbs", ThumbState::Waiting),
                    thumbless_disc("Disc Working Thumbs", ThumbState::Working),
                    thumbless_disc("Disc Error Thumbs", ThumbState::Error),
                    Disc {
                        name: "Disc Done Thumbs".to_string(),
                        thumb_state: ThumbState::Done,
                        files: vec![
                            disc_file("file1", Some("main_title"), "1.2 GB", "01:30:00", 10),
                            disc_file("file2", Some("extra"), "500 MB", "00:45:00", 5),
                            disc_file("file3", Some("trash"), "300 MB", "00:30:00", 3),
                            disc_file("file4", None, "400 MB", "00:40:00", 4),
                        ],
                    },
                ],
            },
        ];

        let unclaimed = vec!["Unclaimed1".to_string(), "Unclaimed 2".to_string()];

        let metadata = vec![
            MovieMetadata {
                title: "Movie 1".to_string(),
                original_title: "Original Movie 1".to_string(),
                release_date: "2023-01-01".to_string(),
                genres: vec!["Action".to_string(), "Adventure".to_string()],
                overview: "An action-packed adventure movie.".to_string(),
            },
            MovieMetadata {
                title: "Movie 2".to_string(),
                original_title: "Original Movie 2".to_string(),
                release_date: "2023-01-02".to_string(),
                genres: vec!["Drama".to_string()],
                overview: "A dramatic story of love and loss.".to_string(),
            },
        ];

        Fixtures {
            dataset: Dataset::from_parts(projects, unclaimed, metadata),
            tables: MappingTables::builtin(),
        }
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Fixtures::builtin()
    }
}

fn thumbless_disc(name: &str, thumb_state: ThumbState) -> Disc {
    Disc {
        name: name.to_string(),
        thumb_state,
        files: vec![],
    }
}

fn disc_file(
    stem: &str,
    category: Option<&str>,
    human_size: &str,
    human_duration: &str,
    num_chapters: i32,
) -> DiscFile {
    DiscFile {
        file: format!("{stem}.mkv"),
        category: category.map(str::to_string),
        thumb: format!("{stem}.jpg"),
        human_size: human_size.to_string(),
        human_duration: human_duration.to_string(),
        num_chapters,
    }
}
