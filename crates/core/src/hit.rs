//! Screen-space index of drawn phase bars for hover and click resolution.

use hcm_timeline_protocol::Rect;

/// Identity of a phase bar that survives re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementKey {
    pub project_id: i64,
    /// Index into the project's `phases` as supplied by the caller.
    pub phase_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitElement {
    pub key: ElementKey,
    pub rect: Rect,
}

/// Bars in draw order. Later entries sit on top.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitIndex {
    elements: Vec<HitElement>,
}

impl HitIndex {
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Record a bar and return its element id (its draw position).
    pub fn push(&mut self, element: HitElement) -> u64 {
        self.elements.push(element);
        (self.elements.len() - 1) as u64
    }

    /// The most recently drawn element containing the point.
    pub fn find(&self, x: f64, y: f64) -> Option<&HitElement> {
        self.elements.iter().rev().find(|e| e.rect.contains(x, y))
    }

    pub fn get(&self, key: ElementKey) -> Option<&HitElement> {
        self.elements.iter().rev().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitElement> {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(project_id: i64, rect: Rect) -> HitElement {
        HitElement {
            key: ElementKey {
                project_id,
                phase_index: 0,
            },
            rect,
        }
    }

    #[test]
    fn later_draw_wins_overlap() {
        let mut index = HitIndex::default();
        index.push(element(1, Rect::new(0.0, 0.0, 100.0, 20.0)));
        index.push(element(2, Rect::new(50.0, 0.0, 100.0, 20.0)));

        assert_eq!(index.find(75.0, 10.0).map(|e| e.key.project_id), Some(2));
        assert_eq!(index.find(25.0, 10.0).map(|e| e.key.project_id), Some(1));
        assert!(index.find(300.0, 10.0).is_none());
    }

    #[test]
    fn push_returns_draw_position() {
        let mut index = HitIndex::default();
        assert_eq!(index.push(element(1, Rect::new(0.0, 0.0, 1.0, 1.0))), 0);
        assert_eq!(index.push(element(2, Rect::new(0.0, 0.0, 1.0, 1.0))), 1);
        index.clear();
        assert!(index.is_empty());
    }
}
