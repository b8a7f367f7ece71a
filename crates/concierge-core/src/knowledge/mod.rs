//! Categorized knowledge base.
//!
//! | Category      | JSON key       | Answer field  | Used by stage            |
//! |---------------|----------------|---------------|--------------------------|
//! | Size info     | `sizeInfo`     | `description` | size lookup              |
//! | Covering      | `covering`     | `answer`      | follow-up, pooled match  |
//! | Biz tiers     | `biz`          | `description` | tier rule, pooled match  |
//! | Brand history | `history`      | `description` | history rule             |
//! | Goods info    | `goodsInfo`    | `description` | approximate              |
//! | Home page     | `homePage`     | `description` | membership, approximate  |
//! | Delivery info | `deliveryInfo` | `description` | approximate              |

mod category;
mod store;

pub use category::{Category, CategoryKind, KnowledgeEntry, Question, CATEGORY_LABELS};
pub use store::{CategoryStatus, KnowledgeBase, KnowledgeLoadError};
