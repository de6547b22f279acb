// src/partition.rs
//! Двоичное разбиение пространства (BSP)
//!
//! Прямоугольник рекурсивно делится на два, пока каждая половина не меньше
//! минимального размера листа. Дерево хранится как арена узлов, на которые
//! ссылаются по индексу: оно живёт только во время одного вызова генератора и
//! после фазы разбиения не перестраивается.
//!
//! ## Правила разбиения
//!
//! - Делится более длинная сторона. Если соотношение сторон меньше порога
//!   `split_bias` (например, 1.25), режется та сторона, после которой половины
//!   ближе к квадрату: снова более длинная, у квадрата — ширина.
//! - Позиция разреза равномерна в диапазоне, где обе половины ≥ `min_size`.
//!   Если такого диапазона нет, узел остаётся листом.
//! - Глубина дополнительно ограничена `ceil(log2(max_side / min_size)) + 1`.
//!
//! Некорректные параметры (лист больше области, нулевой размер) никогда не
//! приводят к бесконечной рекурсии: узел просто не делится.

use crate::grid::Rect;
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionNode {
    pub rect: Rect,
    pub depth: usize,
    pub children: Option<(usize, usize)>,
    /// Комната, вырезанная генератором в листе (если есть)
    pub room: Option<Rect>,
}

impl PartitionNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct PartitionTree {
    nodes: Vec<PartitionNode>,
    min_size: usize,
}

/// Предельная глубина дерева для стороны `side` и минимального листа `min_size`
#[must_use]
pub fn depth_limit(side: usize, min_size: usize) -> usize {
    let ratio = side as f64 / min_size.max(1) as f64;
    if ratio <= 1.0 {
        1
    } else {
        ratio.log2().ceil() as usize + 1
    }
}

impl PartitionTree {
    pub fn build<R: Rng>(area: Rect, min_size: usize, split_bias: f32, rng: &mut R) -> Self {
        let min_size = min_size.max(1);
        let max_depth = depth_limit(area.width.max(area.height), min_size);
        let mut tree = Self {
            nodes: vec![PartitionNode {
                rect: area,
                depth: 0,
                children: None,
                room: None,
            }],
            min_size,
        };

        let mut pending = vec![0];
        while let Some(id) = pending.pop() {
            let node = &tree.nodes[id];
            if node.depth >= max_depth {
                continue;
            }
            let depth = node.depth + 1;
            let Some((first, second)) = split_rect(node.rect, min_size, split_bias, rng) else {
                continue;
            };

            let left = tree.push(first, depth);
            let right = tree.push(second, depth);
            tree.nodes[id].children = Some((left, right));
            pending.push(right);
            pending.push(left);
        }
        tree
    }

    fn push(&mut self, rect: Rect, depth: usize) -> usize {
        self.nodes.push(PartitionNode {
            rect,
            depth,
            children: None,
            room: None,
        });
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn root(&self) -> usize {
        0
    }

    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    #[must_use]
    pub fn node(&self, id: usize) -> &PartitionNode {
        &self.nodes[id]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaves(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|&id| self.nodes[id].is_leaf())
    }

    /// Внутренние узлы от глубоких к корню: дети всегда раньше родителя
    pub fn internal_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len())
            .rev()
            .filter(|&id| !self.nodes[id].is_leaf())
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn set_room(&mut self, id: usize, room: Rect) {
        self.nodes[id].room = Some(room);
    }

    /// Комната узла; для внутреннего узла — комната случайного потомка
    pub fn representative_room<R: Rng>(&self, id: usize, rng: &mut R) -> Option<Rect> {
        let node = &self.nodes[id];
        if let Some(room) = node.room {
            return Some(room);
        }
        let (left, right) = node.children?;
        let (first, second) = if rng.gen_bool(0.5) {
            (left, right)
        } else {
            (right, left)
        };
        self.representative_room(first, rng)
            .or_else(|| self.representative_room(second, rng))
    }
}

/// Делит прямоугольник на две части или возвращает `None`
fn split_rect<R: Rng>(
    rect: Rect,
    min_size: usize,
    split_bias: f32,
    rng: &mut R,
) -> Option<(Rect, Rect)> {
    let w = rect.width as f32;
    let h = rect.height as f32;
    if rect.width == 0 || rect.height == 0 {
        return None;
    }

    // true — разрез поперёк высоты (две части одна над другой).
    // Ниже порога режется более длинная сторона, у квадрата — ширина.
    let cut_rows = if w / h >= split_bias {
        false
    } else if h / w >= split_bias {
        true
    } else {
        rect.height > rect.width
    };

    let extent = if cut_rows { rect.height } else { rect.width };
    if extent < min_size * 2 {
        return None;
    }
    let at = rng.gen_range(min_size..=extent - min_size);

    Some(if cut_rows {
        (
            Rect::new(rect.x, rect.y, rect.width, at),
            Rect::new(rect.x, rect.y + at, rect.width, rect.height - at),
        )
    } else {
        (
            Rect::new(rect.x, rect.y, at, rect.height),
            Rect::new(rect.x + at, rect.y, rect.width - at, rect.height),
        )
    })
}
