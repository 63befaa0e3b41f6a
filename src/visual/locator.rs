use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::record::schema::{LayoutCell, RecordSnapshot};
use crate::visual::paint::LabelPaint;

/// An addressable label node that visual state is painted onto.
pub trait LabelNode: Send + Sync {
    fn id(&self) -> &str;
    fn paint(&self, paint: &LabelPaint);
    fn scroll_into_view(&self) {}
}

/// Finds the label node for a canonical field name.
pub trait DisplayLocator: Send + Sync {
    fn locate(&self, field_name: &str) -> Option<Arc<dyn LabelNode>>;
}

/// In-memory label node, used by [`LabelBoard`].
pub struct BoardNode {
    id: String,
    cell: LayoutCell,
    current: Mutex<LabelPaint>,
    scrolls: Mutex<u32>,
}

impl BoardNode {
    pub fn cell(&self) -> &LayoutCell {
        &self.cell
    }

    pub fn current_paint(&self) -> LabelPaint {
        self.current.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn scroll_count(&self) -> u32 {
        self.scrolls.lock().map(|n| *n).unwrap_or(0)
    }
}

impl LabelNode for BoardNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn paint(&self, paint: &LabelPaint) {
        if let Ok(mut current) = self.current.lock() {
            if *current != *paint {
                tracing::info!(
                    node = %self.id,
                    label = %self.cell.label,
                    classes = ?paint.classes,
                    outline = ?paint.outline_color,
                    "label repainted"
                );
            }
            *current = paint.clone();
        }
    }

    fn scroll_into_view(&self) {
        if let Ok(mut n) = self.scrolls.lock() {
            *n += 1;
        }
        tracing::debug!(node = %self.id, "scrolled into view");
    }
}

/// Label nodes of one displayed record, addressed like the host page does:
/// the cell whose structural name is the field, else a global label-text match.
pub struct LabelBoard {
    nodes: Mutex<Vec<Arc<BoardNode>>>,
    /// field name → display label, for the text-match fallback.
    labels: HashMap<String, String>,
}

impl LabelBoard {
    pub fn from_snapshot(snapshot: &RecordSnapshot) -> Self {
        let labels = snapshot
            .fields
            .iter()
            .map(|f| (f.field_name.clone(), f.label.clone()))
            .collect();
        Self::new(snapshot.layout_or_default(), labels)
    }

    pub fn new(cells: Vec<LayoutCell>, labels: HashMap<String, String>) -> Self {
        let nodes = cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                Arc::new(BoardNode {
                    id: format!("label-{i}"),
                    cell,
                    current: Mutex::new(LabelPaint::default()),
                    scrolls: Mutex::new(0),
                })
            })
            .collect();
        Self {
            nodes: Mutex::new(nodes),
            labels,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), HashMap::new())
    }

    /// Drops every node whose structural name is `field_name`, as when the host re-renders.
    pub fn remove_cell(&self, field_name: &str) -> usize {
        let Ok(mut nodes) = self.nodes.lock() else {
            return 0;
        };
        let before = nodes.len();
        nodes.retain(|n| n.cell.name.as_deref() != Some(field_name));
        before - nodes.len()
    }

    /// Concrete node lookup, for callers that want to inspect paint.
    pub fn find(&self, field_name: &str) -> Option<Arc<BoardNode>> {
        let nodes = self.nodes.lock().ok()?;

        if let Some(node) = nodes
            .iter()
            .find(|n| n.cell.name.as_deref() == Some(field_name))
        {
            return Some(node.clone());
        }

        let text_matches = |needle: &str| {
            let needle = needle.trim().to_lowercase();
            nodes
                .iter()
                .find(|n| n.cell.label.trim().to_lowercase() == needle)
                .cloned()
        };
        self.labels
            .get(field_name)
            .and_then(|label| text_matches(label))
            .or_else(|| text_matches(field_name))
    }
}

impl DisplayLocator for LabelBoard {
    fn locate(&self, field_name: &str) -> Option<Arc<dyn LabelNode>> {
        if field_name.is_empty() {
            return None;
        }
        self.find(field_name).map(|n| n as Arc<dyn LabelNode>)
    }
}
