//! Kanban board and review panel conventions.

/// Where the drag placeholder goes in a column.
///
/// `child_bounds` holds the `(top, bottom)` of each card in the column in
/// order. The placeholder goes before the first card whose vertical midpoint
/// lies below the pointer, or after the last card.
pub fn placeholder_index(child_bounds: &[(f64, f64)], pointer_y: f64) -> usize {
    child_bounds
        .iter()
        .position(|&(top, bottom)| (top + bottom) / 2.0 > pointer_y)
        .unwrap_or(child_bounds.len())
}

/// Id of the element holding a reviewer's comment on a checklist question.
pub fn checklist_comment_id(user: &str, section: &str, question: &str) -> String {
    format!("comment-{user}-sec-{section}-question-{question}")
}

pub fn reviewer_tab_id(index: usize) -> String {
    format!("tab-{index}")
}

pub fn checklist_panel_id(index: usize) -> String {
    format!("checklist-{index}")
}
