//! Ready-made template arrangements.

use super::template::{Slot, Template, TemplateCanvas};

/// Names of every built-in preset, in lookup order.
pub const PRESET_NAMES: [&str; 5] = [
    "instagram-grid",
    "dashboard-shot",
    "horizontal-book-spread",
    "vertical-book-spread",
    "art-gallery",
];

/// Look up a built-in template by name; `None` for unknown names.
pub fn by_name(name: &str) -> Option<Template> {
    match name {
        "instagram-grid" => Some(instagram_grid()),
        "dashboard-shot" => Some(dashboard_shot()),
        "horizontal-book-spread" => Some(horizontal_book_spread()),
        "vertical-book-spread" => Some(vertical_book_spread()),
        "art-gallery" => Some(art_gallery()),
        _ => None,
    }
}

/// A 3x6 portrait grid echoing a profile feed: one hero, small tiles, and a
/// wide footer.
pub fn instagram_grid() -> Template {
    Template {
        canvas: TemplateCanvas {
            width: 2400,
            height: 3200,
            columns: 3,
            rows: 6,
        },
        slots: vec![
            Slot::new(1, 1, 2, 2),
            Slot::new(3, 1, 1, 1),
            Slot::new(3, 2, 1, 1),
            Slot::new(1, 3, 1, 2),
            Slot::new(2, 3, 2, 2),
            Slot::new(1, 5, 3, 2),
        ],
    }
}

/// A 6x4 landscape grid for product shots: one large lead plus five
/// supporting panels.
pub fn dashboard_shot() -> Template {
    Template {
        canvas: TemplateCanvas {
            width: 3600,
            height: 2400,
            columns: 6,
            rows: 4,
        },
        slots: vec![
            Slot::new(1, 1, 3, 2),
            Slot::new(4, 1, 3, 1),
            Slot::new(4, 2, 3, 1),
            Slot::new(1, 3, 2, 2),
            Slot::new(3, 3, 2, 2),
            Slot::new(5, 3, 2, 2),
        ],
    }
}

/// A wide two-page spread: a full-height left page and a split right page.
pub fn horizontal_book_spread() -> Template {
    Template {
        canvas: TemplateCanvas {
            width: 4800,
            height: 2800,
            columns: 8,
            rows: 3,
        },
        slots: vec![
            Slot::new(1, 1, 3, 3),
            Slot::new(4, 1, 5, 1),
            Slot::new(4, 2, 5, 2),
        ],
    }
}

/// A tall two-page spread: a full-width header over two columns.
pub fn vertical_book_spread() -> Template {
    Template {
        canvas: TemplateCanvas {
            width: 2800,
            height: 4200,
            columns: 2,
            rows: 3,
        },
        slots: vec![
            Slot::new(1, 1, 2, 1),
            Slot::new(1, 2, 1, 2),
            Slot::new(2, 2, 1, 2),
        ],
    }
}

/// A 5x5 gallery wall mixing one large piece with four smaller frames.
pub fn art_gallery() -> Template {
    Template {
        canvas: TemplateCanvas {
            width: 4000,
            height: 3000,
            columns: 5,
            rows: 5,
        },
        slots: vec![
            Slot::new(1, 1, 3, 3),
            Slot::new(4, 1, 2, 2),
            Slot::new(4, 3, 2, 1),
            Slot::new(1, 4, 2, 2),
            Slot::new(3, 4, 3, 2),
        ],
    }
}
