//! Collision categories and body masks
//!
//! Every physics body in the world carries one category tag. Masks are bitsets of
//! categories: `contact_test` selects which contacts get reported, `collision`
//! which ones physically push back (always empty on a ski slope).

use serde::{Deserialize, Serialize};

/// Physical body tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionCategory {
    None,
    Player,
    Tree,
    Rock,
    Gate,
    Finish,
}

impl CollisionCategory {
    /// Single-bit mask for this category (`None` is empty)
    pub const fn bits(self) -> u32 {
        match self {
            CollisionCategory::None => 0,
            CollisionCategory::Player => 1 << 0,
            CollisionCategory::Tree => 1 << 1,
            CollisionCategory::Rock => 1 << 2,
            CollisionCategory::Gate => 1 << 3,
            CollisionCategory::Finish => 1 << 4,
        }
    }

    /// Trees and rocks crash the skier
    pub fn is_obstacle(self) -> bool {
        matches!(self, CollisionCategory::Tree | CollisionCategory::Rock)
    }
}

/// Set of categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    pub const EMPTY: CategoryMask = CategoryMask(0);

    pub fn of(categories: &[CollisionCategory]) -> Self {
        Self(categories.iter().fold(0, |acc, c| acc | c.bits()))
    }

    pub fn contains(self, category: CollisionCategory) -> bool {
        let bits = category.bits();
        bits != 0 && self.0 & bits == bits
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CategoryMask {
    type Output = CategoryMask;

    fn bitor(self, rhs: Self) -> Self {
        CategoryMask(self.0 | rhs.0)
    }
}

impl From<CollisionCategory> for CategoryMask {
    fn from(category: CollisionCategory) -> Self {
        CategoryMask(category.bits())
    }
}

/// Category plus contact-test and collision masks of one body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyMask {
    pub category: CollisionCategory,
    pub contact_test: CategoryMask,
    pub collision: CategoryMask,
}

impl BodyMask {
    /// A body that neither reports nor takes part in contacts
    pub const DISABLED: BodyMask = BodyMask {
        category: CollisionCategory::None,
        contact_test: CategoryMask::EMPTY,
        collision: CategoryMask::EMPTY,
    };

    /// Fresh skier: reports gates, obstacles and the finish line
    pub fn player_spawn() -> Self {
        let recovered = Self::player_recovered();
        Self {
            contact_test: recovered.contact_test | CollisionCategory::Finish.into(),
            ..recovered
        }
    }

    /// Skier after crash recovery. The finish body tests for the player on its
    /// own side, so finish contacts are still reported.
    pub fn player_recovered() -> Self {
        Self {
            category: CollisionCategory::Player,
            contact_test: CategoryMask::of(&[
                CollisionCategory::Gate,
                CollisionCategory::Tree,
                CollisionCategory::Rock,
            ]),
            collision: CategoryMask::EMPTY,
        }
    }

    /// Static world body (tree, rock, gate, finish) that reports the player
    pub fn scenery(category: CollisionCategory) -> Self {
        Self {
            category,
            contact_test: CollisionCategory::Player.into(),
            collision: CategoryMask::EMPTY,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.category == CollisionCategory::None
            && self.contact_test.is_empty()
            && self.collision.is_empty()
    }
}
