use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Category {
    Suspect = 0,
    Weapon = 1,
    Room = 2,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Suspect, Category::Weapon, Category::Room];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Category::Suspect),
            1 => Some(Category::Weapon),
            2 => Some(Category::Room),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Suspect => "Suspect",
            Category::Weapon => "Weapon",
            Category::Room => "Room",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "suspect" => Some(Category::Suspect),
            "weapon" => Some(Category::Weapon),
            "room" => Some(Category::Room),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
