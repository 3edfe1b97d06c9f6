use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two independent timer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Study,
    Coding,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Study, Category::Coding];

    /// The track that is not `self`.
    pub fn other(self) -> Category {
        match self {
            Category::Study => Category::Coding,
            Category::Coding => Category::Study,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Study => "Study",
            Category::Coding => "Coding",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
