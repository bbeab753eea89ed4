//! Training corpora: the built-in seed samples and JSON example files.

use crate::error::MlError;
use cscout_core::{BugCategory, TrainingExample};
use std::path::Path;

/// Small hand-labelled corpus covering each lexical category once, the
/// missing-return case, and two clean programs.
pub fn seed_corpus() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(
            "int* ptr = malloc(sizeof(int));\n*ptr = 42;\nreturn ptr;\n",
            [BugCategory::MemoryLeak],
        ),
        TrainingExample::new(
            "struct Node* node;\nnode->data = 42;\n",
            [BugCategory::NullPointer],
        ),
        TrainingExample::new(
            "char buffer[5];\nstrcpy(buffer, \"This is too long\");\n",
            [BugCategory::BufferOverflow],
        ),
        TrainingExample::new(
            "int sum;\nfor(int i = 0; i < 10; i++) {\n    sum += i;\n}\n",
            [BugCategory::UninitializedVar],
        ),
        TrainingExample::new(
            "while(1) {\n    printf(\"Forever\");\n}\n",
            [BugCategory::InfiniteLoop],
        ),
        TrainingExample::new(
            "int get_value() {\n    int x = 42;\n}\n",
            [BugCategory::MissingReturn],
        ),
        TrainingExample::clean("int* ptr = malloc(sizeof(int));\n*ptr = 42;\nfree(ptr);\nreturn 0;\n"),
        TrainingExample::clean(
            "int sum = 0;\nfor(int i = 0; i < 10; i++) {\n    sum += i;\n}\nreturn sum;\n",
        ),
    ]
}

/// Load examples from a JSON file: either an array of
/// `{"source_text": ..., "labels": [...]}` objects or one such object per line.
pub fn load_examples(path: &Path) -> Result<Vec<TrainingExample>, MlError> {
    let text = std::fs::read_to_string(path)?;
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(MlError::from))
        .collect()
}
