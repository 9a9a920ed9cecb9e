use glam::IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Pip,
    Energizer,
}

impl ItemType {
    /// Level score awarded on collection.
    pub fn get_score(self) -> u32 {
        match self {
            ItemType::Pip => 1,
            ItemType::Energizer => 0,
        }
    }
}

/// The active pickups of a level. Collected items are removed, never flagged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Items {
    pips: Vec<IVec2>,
    energizers: Vec<IVec2>,
}

impl Items {
    pub fn new(pips: Vec<IVec2>, energizers: Vec<IVec2>) -> Self {
        Self { pips, energizers }
    }

    pub fn energizers(&self) -> &[IVec2] {
        &self.energizers
    }

    pub fn pips_left(&self) -> usize {
        self.pips.len()
    }

    /// Removes the item of the given type at `position`, returning whether one was there.
    pub fn collect(&mut self, item_type: ItemType, position: IVec2) -> bool {
        let items = match item_type {
            ItemType::Pip => &mut self.pips,
            ItemType::Energizer => &mut self.energizers,
        };
        match items.iter().position(|item| *item == position) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }
}
