use std::collections::HashMap;

use crate::error::{Result, ShellError};
use crate::geometry::{Rect, Size};

/// Layout direction for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Row,
    Column,
}

/// Space distribution rules for child nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    Fixed(u16),
    Percent(u8),
    Min(u16),
    Max(u16),
    Flex(u16),
}

/// Unique identifier for layout nodes.
pub type NodeId = String;

/// Layout node representation (container or leaf).
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: NodeId,
    pub direction: Direction,
    pub constraints: Vec<Constraint>,
    pub children: Vec<LayoutNode>,
    pub gap: u16,
    pub padding: u16,
}

impl LayoutNode {
    pub fn leaf(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            direction: Direction::Row,
            constraints: Vec::new(),
            children: Vec::new(),
            gap: 0,
            padding: 0,
        }
    }

    pub fn container(
        id: impl Into<NodeId>,
        direction: Direction,
        constraints: Vec<Constraint>,
        children: Vec<LayoutNode>,
    ) -> Self {
        Self {
            id: id.into(),
            direction,
            constraints,
            children,
            gap: 0,
            padding: 0,
        }
    }

    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_padding(mut self, padding: u16) -> Self {
        self.padding = padding;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Layout tree orchestrator.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    pub root: LayoutNode,
}

impl LayoutTree {
    pub fn new(root: LayoutNode) -> Self {
        Self { root }
    }

    /// Solve the layout tree for a terminal size, returning rects keyed by node id.
    pub fn solve(&self, size: Size) -> Result<HashMap<NodeId, Rect>> {
        if self.root.children.is_empty() {
            return Err(ShellError::EmptyLayout);
        }

        let mut rects = HashMap::new();
        self.solve_node(
            &self.root,
            Rect::new(0, 0, size.width, size.height),
            &mut rects,
        )?;
        Ok(rects)
    }

    fn solve_node(
        &self,
        node: &LayoutNode,
        rect: Rect,
        accum: &mut HashMap<NodeId, Rect>,
    ) -> Result<()> {
        accum.insert(node.id.clone(), rect);

        if node.children.is_empty() {
            return Ok(());
        }

        let axis_length = match node.direction {
            Direction::Row => rect.width,
            Direction::Column => rect.height,
        };

        let available = axis_length.saturating_sub(node.padding.saturating_mul(2));
        let gap_total = node
            .gap
            .saturating_mul(node.children.len().saturating_sub(1) as u16);
        let distributable = available.saturating_sub(gap_total);

        let spans = distribute(distributable, node.children.len(), &node.constraints);

        let mut cursor = match node.direction {
            Direction::Row => rect.x + node.padding,
            Direction::Column => rect.y + node.padding,
        };

        for (child, span) in node.children.iter().zip(spans) {
            let child_rect = match node.direction {
                Direction::Row => Rect::new(
                    cursor,
                    rect.y + node.padding,
                    span,
                    rect.height.saturating_sub(node.padding.saturating_mul(2)),
                ),
                Direction::Column => Rect::new(
                    rect.x + node.padding,
                    cursor,
                    rect.width.saturating_sub(node.padding.saturating_mul(2)),
                    span,
                ),
            };

            self.solve_node(child, child_rect, accum)?;
            cursor = cursor.saturating_add(span).saturating_add(node.gap);
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Segment {
    length: u32,
    min: u32,
    max: Option<u32>,
    flex: u32,
}

impl Segment {
    fn from_constraint(constraint: Constraint, distributable: u16) -> Self {
        let mut segment = Self {
            length: 0,
            min: 0,
            max: None,
            flex: 1,
        };
        match constraint {
            Constraint::Fixed(value) => {
                segment.length = value as u32;
                segment.min = value as u32;
                segment.max = Some(value as u32);
                segment.flex = 0;
            }
            Constraint::Percent(percent) => {
                let value = ((distributable as f32) * (percent as f32 / 100.0)).round() as u32;
                segment.length = value;
                segment.min = value;
                segment.max = Some(value);
                segment.flex = 0;
            }
            Constraint::Min(min) => {
                segment.length = min as u32;
                segment.min = min as u32;
            }
            Constraint::Max(max) => {
                segment.max = Some(max as u32);
            }
            Constraint::Flex(weight) => {
                segment.flex = weight.max(1) as u32;
            }
        }
        segment
    }

    fn headroom(&self) -> u32 {
        self.max
            .map(|max| max.saturating_sub(self.length))
            .unwrap_or(u32::MAX)
    }
}

fn distribute(distributable: u16, child_count: usize, constraints: &[Constraint]) -> Vec<u16> {
    if child_count == 0 {
        return Vec::new();
    }

    let mut segments: Vec<Segment> = (0..child_count)
        .map(|idx| {
            let constraint = constraints.get(idx).copied().unwrap_or(Constraint::Flex(1));
            Segment::from_constraint(constraint, distributable)
        })
        .collect();

    let total_available = distributable as u32;
    let mut used: u32 = segments.iter().map(|s| s.length).sum();

    if used > total_available {
        shrink_segments(&mut segments, used - total_available);
        used = segments.iter().map(|s| s.length).sum();
    }

    let remaining = total_available.saturating_sub(used);
    if remaining > 0 {
        distribute_flex(&mut segments, remaining);
    }

    segments
        .into_iter()
        .map(|segment| segment.length.min(u16::MAX as u32) as u16)
        .collect()
}

fn shrink_segments(segments: &mut [Segment], mut over: u32) {
    while over > 0 {
        let mut changed = false;
        for segment in segments.iter_mut() {
            if segment.length > segment.min {
                segment.length -= 1;
                over -= 1;
                changed = true;
                if over == 0 {
                    break;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

fn distribute_flex(segments: &mut [Segment], remaining: u32) {
    let total_flex: u32 = segments.iter().map(|s| s.flex).sum();
    if total_flex == 0 {
        return;
    }

    let mut leftover = remaining;
    for segment in segments.iter_mut() {
        if segment.flex == 0 {
            continue;
        }
        let share = (remaining * segment.flex) / total_flex;
        let addition = share.min(leftover).min(segment.headroom());
        segment.length = segment.length.saturating_add(addition);
        leftover = leftover.saturating_sub(addition);
    }

    // Round-robin any remainder left by integer division.
    let count = segments.len();
    let mut idx = 0;
    let mut attempts = 0;
    while leftover > 0 && attempts < count * 4 {
        let segment = &mut segments[idx % count];
        if segment.flex > 0 && segment.headroom() > 0 {
            segment.length += 1;
            leftover -= 1;
        }
        idx += 1;
        attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribute_single_child() {
        let values = distribute(80, 1, &[]);
        assert_eq!(values, vec![80]);
    }

    #[test]
    fn desktop_column_reserves_menubar_and_dock() {
        let root = LayoutNode {
            id: "shell:root".into(),
            direction: Direction::Column,
            constraints: vec![
                Constraint::Fixed(1),
                Constraint::Flex(1),
                Constraint::Fixed(1),
            ],
            children: vec![
                LayoutNode::leaf("shell:menubar"),
                LayoutNode::leaf("shell:desktop"),
                LayoutNode::leaf("shell:dock"),
            ],
            gap: 0,
            padding: 0,
        };

        let rects = LayoutTree::new(root).solve(Size::new(80, 24)).unwrap();
        assert_eq!(rects.get("shell:menubar").unwrap().height, 1);
        assert_eq!(rects.get("shell:desktop").unwrap().height, 22);
        assert_eq!(rects.get("shell:dock").unwrap().y, 23);
    }

    #[test]
    fn menubar_row_with_mixed_constraints() {
        let root = LayoutNode {
            id: "shell:menubar".into(),
            direction: Direction::Row,
            constraints: vec![
                Constraint::Fixed(10),
                Constraint::Flex(1),
                Constraint::Fixed(12),
                Constraint::Fixed(9),
            ],
            children: vec![
                LayoutNode::leaf("theme"),
                LayoutNode::leaf("spacer"),
                LayoutNode::leaf("date"),
                LayoutNode::leaf("time"),
            ],
            gap: 1,
            padding: 0,
        };

        let rects = LayoutTree::new(root).solve(Size::new(80, 1)).unwrap();
        assert_eq!(rects.get("theme").unwrap().width, 10);
        assert_eq!(rects.get("spacer").unwrap().width, 46);
        assert_eq!(rects.get("date").unwrap().x, 58);
        assert_eq!(rects.get("time").unwrap().right(), 80);
    }

    #[test]
    fn min_and_max_respected_in_columns() {
        let root = LayoutNode {
            id: "root".into(),
            direction: Direction::Column,
            constraints: vec![Constraint::Min(6), Constraint::Max(4), Constraint::Flex(1)],
            children: vec![
                LayoutNode::leaf("top"),
                LayoutNode::leaf("middle"),
                LayoutNode::leaf("bottom"),
            ],
            gap: 1,
            padding: 1,
        };

        let rects = LayoutTree::new(root).solve(Size::new(40, 20)).unwrap();
        let top = rects.get("top").unwrap();
        let middle = rects.get("middle").unwrap();
        let bottom = rects.get("bottom").unwrap();

        assert!(top.height >= 6);
        assert!(middle.height <= 4);
        assert!(bottom.height > 0);
        assert_eq!(top.height + middle.height + bottom.height + 2 + 2, 20);
    }

    #[test]
    fn empty_tree_is_an_error() {
        let tree = LayoutTree::new(LayoutNode::leaf("only"));
        assert!(tree.solve(Size::new(10, 10)).is_err());
    }
}
