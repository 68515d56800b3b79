//! Shared test fixtures for integration tests.
//!
//! [`TempWorkspace`] is a temp directory that cleans itself up. [`DocsSite`] writes a
//! small Doxygen search index (three categories, seven shards) into one so tests can
//! exercise the real file layout without a Doxygen run.

#![allow(dead_code)] // Each integration test crate uses a different subset.

use doxsearch::config::Config;
use doxsearch::context::DocsContext;
use rstest::fixture;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace directory for test isolation.
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file, and its parent directories, within this workspace.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    pub fn remove_file(&self, path: &str) {
        std::fs::remove_file(self.root.join(path))
            .unwrap_or_else(|e| panic!("Failed to remove file '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the fixture writes the search directory, relative to the workspace.
pub const SEARCH_DIR: &str = "docs/html/search";

pub const SEARCHDATA: &str = r#"var indexSectionsWithContent =
{
  0: "cfmw",
  1: "w",
  2: "cf"
};

var indexSectionNames =
{
  0: "all",
  1: "classes",
  2: "functions"
};

var indexSectionLabels =
{
  0: "All",
  1: "Classes",
  2: "Functions"
};
"#;

const ALL_C: &str = r"var searchData=
[
  ['compute_0',['compute',['../class_widget.html#a1b2',1,'Widget']]],
  ['count_5fitems_1',['count_items',['../util_8h.html#a3',1,'count_items(int n):&#160;util.h'],['../util_8c.html#a4',1,'count_items(int n):&#160;util.c']]]
];
";

const ALL_F: &str = r"var searchData=
[
  ['foo_5fbar_2',['foo_bar',['../util_8h.html#a5',1,'util.h']]],
  ['foo_5fbaz_3',['foo_baz',['../util_8h.html#a6',1,'util.h']]]
];
";

const ALL_M: &str = r"var searchData=
[
  ['main_4',['main',['../main_8c.html#a7',1,'main.c']]]
];
";

const ALL_W: &str = r"var searchData=
[
  ['widget_5',['Widget',['../class_widget.html',1,'']]]
];
";

const FUNCTIONS_C: &str = r"var searchData=
[
  ['compute_0',['compute',['../class_widget.html#a1b2',1,'Widget']]],
  ['count_5fitems_1',['count_items',['../util_8h.html#a3',1,'util.h']]]
];
";

const FUNCTIONS_F: &str = r"var searchData=
[
  ['foo_5fbar_2',['foo_bar',['../util_8h.html#a5',1,'util.h']]],
  ['foo_5fbaz_3',['foo_baz',['../util_8h.html#a6',1,'util.h']]]
];
";

/// A generated documentation site inside a temp workspace.
pub struct DocsSite {
    pub workspace: TempWorkspace,
}

impl DocsSite {
    pub fn new() -> Self {
        let workspace = TempWorkspace::new();
        workspace.create_file(&format!("{}/searchdata.js", SEARCH_DIR), SEARCHDATA);
        for (file, content) in [
            ("all_0.js", ALL_C),
            ("all_1.js", ALL_F),
            ("all_2.js", ALL_M),
            ("all_3.js", ALL_W),
            ("classes_0.js", ALL_W),
            ("functions_0.js", FUNCTIONS_C),
            ("functions_1.js", FUNCTIONS_F),
        ] {
            workspace.create_file(&format!("{}/{}", SEARCH_DIR, file), content);
        }
        Self { workspace }
    }

    pub fn root(&self) -> &str {
        self.workspace.path().to_str().expect("temp path is UTF-8")
    }

    pub fn search_dir(&self) -> PathBuf {
        self.workspace.path().join(SEARCH_DIR)
    }

    pub fn shard_path(&self, file: &str) -> PathBuf {
        self.search_dir().join(file)
    }

    pub async fn open(&self) -> DocsContext {
        DocsContext::open(self.root(), &Config::default())
            .await
            .expect("fixture site should open")
    }
}

/// A freshly written documentation site.
#[fixture]
pub fn docs_site() -> DocsSite {
    doxsearch::tracing::init();
    DocsSite::new()
}
