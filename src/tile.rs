// src/tile.rs
//! Типы местности и отдельная клетка поля боя
//!
//! Каждый тип местности (`TileKind`) несёт четыре фиксированных свойства:
//! - проходимость для танка
//! - проходимость для снаряда
//! - рикошет снаряда
//! - укрытие (танк в траве не виден)
//!
//! Свойства принадлежат типу, а не клетке: после разрушения кирпича клетка
//! просто меняет тип на `Empty`, и все флаги автоматически становятся верными.

use serde::{Deserialize, Serialize};

/// Тип местности клетки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    /// Открытая земля
    #[default]
    Empty,
    /// Кирпич: блокирует танк и снаряд, разрушается в `Empty`
    Brick,
    /// Камень: неразрушим, снаряд рикошетит
    Stone,
    /// Вода: танк не пройдёт, снаряд пролетает
    Water,
    /// Трава: проходима и даёт укрытие
    Grass,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Empty,
        TileKind::Brick,
        TileKind::Stone,
        TileKind::Water,
        TileKind::Grass,
    ];

    #[must_use]
    pub fn tank_passable(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Grass)
    }

    #[must_use]
    pub fn bullet_passable(self) -> bool {
        matches!(self, TileKind::Empty | TileKind::Water | TileKind::Grass)
    }

    #[must_use]
    pub fn reflects_bullet(self) -> bool {
        self == TileKind::Stone
    }

    #[must_use]
    pub fn provides_cover(self) -> bool {
        self == TileKind::Grass
    }

    #[must_use]
    pub fn destructible(self) -> bool {
        self == TileKind::Brick
    }

    /// Числовой код типа для сериализации карты
    ///
    /// ```
    /// use tankfield::TileKind;
    /// assert_eq!(TileKind::Stone.code(), 2);
    /// assert_eq!(TileKind::from_code(4), Some(TileKind::Grass));
    /// assert_eq!(TileKind::from_code(9), None);
    /// ```
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            TileKind::Empty => 0,
            TileKind::Brick => 1,
            TileKind::Stone => 2,
            TileKind::Water => 3,
            TileKind::Grass => 4,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TileKind::Empty),
            1 => Some(TileKind::Brick),
            2 => Some(TileKind::Stone),
            3 => Some(TileKind::Water),
            4 => Some(TileKind::Grass),
            _ => None,
        }
    }

    /// Символ для текстового превью
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Brick => '#',
            TileKind::Stone => '@',
            TileKind::Water => '~',
            TileKind::Grass => '"',
        }
    }

    /// Цвет по умолчанию для PNG-превью
    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            TileKind::Empty => [24, 24, 24],
            TileKind::Brick => [170, 74, 44],
            TileKind::Stone => [140, 140, 150],
            TileKind::Water => [30, 90, 200],
            TileKind::Grass => [60, 150, 60],
        }
    }
}

/// Одна клетка поля боя
///
/// Координаты задаются при создании сетки и больше не меняются.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    kind: TileKind,
    destroyed: bool,
}

impl Tile {
    #[must_use]
    pub fn new(row: usize, col: usize, kind: TileKind) -> Self {
        Self {
            row,
            col,
            kind,
            destroyed: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Меняет тип клетки на этапе генерации
    pub(crate) fn set_kind(&mut self, kind: TileKind) {
        self.kind = kind;
        self.destroyed = false;
    }

    /// Разрушение попаданием снаряда: `Brick` → `Empty`.
    ///
    /// Возвращает `true`, если клетка действительно изменилась.
    pub fn destroy(&mut self) -> bool {
        if self.kind.destructible() {
            self.kind = TileKind::Empty;
            self.destroyed = true;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn tank_passable(&self) -> bool {
        self.kind.tank_passable()
    }

    #[must_use]
    pub fn bullet_passable(&self) -> bool {
        self.kind.bullet_passable()
    }

    #[must_use]
    pub fn reflects_bullet(&self) -> bool {
        self.kind.reflects_bullet()
    }

    #[must_use]
    pub fn provides_cover(&self) -> bool {
        self.kind.provides_cover()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_cover_every_kind() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn capability_table_matches_terrain_rules() {
        assert!(TileKind::Empty.tank_passable() && TileKind::Empty.bullet_passable());
        assert!(!TileKind::Brick.tank_passable() && !TileKind::Brick.bullet_passable());
        assert!(TileKind::Stone.reflects_bullet() && !TileKind::Stone.destructible());
        assert!(!TileKind::Water.tank_passable() && TileKind::Water.bullet_passable());
        assert!(TileKind::Grass.tank_passable() && TileKind::Grass.provides_cover());
    }

    #[test]
    fn destroying_brick_twice_matches_destroying_once() {
        let mut tile = Tile::new(3, 4, TileKind::Brick);
        assert!(tile.destroy());
        let once = tile;
        assert!(!tile.destroy());
        assert_eq!(tile, once);
        assert_eq!(tile.kind(), TileKind::Empty);
        assert!(tile.is_destroyed());
        assert!(tile.tank_passable() && tile.bullet_passable());
    }

    #[test]
    fn destroy_ignores_indestructible_kinds() {
        let mut tile = Tile::new(0, 0, TileKind::Stone);
        assert!(!tile.destroy());
        assert_eq!(tile.kind(), TileKind::Stone);
        assert!(!tile.is_destroyed());
    }
}
