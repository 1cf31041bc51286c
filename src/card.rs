use std::collections::BTreeSet;

pub const OCCUPIED_MARKUP: &str = r#"<span class="icon">✅</span> Ocupada"#;
pub const FREE_MARKUP: &str = r#"<span class="icon">🍽️</span> Libre"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
}

impl Occupancy {
    pub fn from_occupied(is_occupied: bool) -> Self {
        if is_occupied {
            Self::Occupied
        } else {
            Self::Free
        }
    }

    /// CSS class carried by a card in this state.
    pub fn class(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Occupied => "occupied",
        }
    }

    pub fn status_markup(self) -> &'static str {
        match self {
            Self::Free => FREE_MARKUP,
            Self::Occupied => OCCUPIED_MARKUP,
        }
    }

    fn opposite(self) -> Self {
        match self {
            Self::Free => Self::Occupied,
            Self::Occupied => Self::Free,
        }
    }
}

/// One physical table as shown on the board.
///
/// The class list is the only occupancy state a card has; nothing else is
/// kept between clicks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCard {
    id: String,
    classes: BTreeSet<String>,
    status_html: String,
}

impl TableCard {
    pub fn new(id: impl Into<String>) -> Self {
        let mut classes = BTreeSet::new();
        classes.insert("table-card".to_string());
        Self {
            id: id.into(),
            classes,
            status_html: String::new(),
        }
    }

    /// A card as the board page renders it for a table in `occupancy`.
    pub fn rendered(id: impl Into<String>, occupancy: Occupancy) -> Self {
        let mut card = Self::new(id);
        card.apply(occupancy);
        card
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn status_html(&self) -> &str {
        &self.status_html
    }

    pub fn occupancy(&self) -> Option<Occupancy> {
        if self.has_class(Occupancy::Occupied.class()) {
            Some(Occupancy::Occupied)
        } else if self.has_class(Occupancy::Free.class()) {
            Some(Occupancy::Free)
        } else {
            None
        }
    }

    /// Brings the card's classes and status indicator in line with
    /// `occupancy`. Applying the same state again changes nothing.
    pub fn apply(&mut self, occupancy: Occupancy) {
        self.classes.remove(occupancy.opposite().class());
        self.classes.insert(occupancy.class().to_string());
        self.status_html.clear();
        self.status_html.push_str(occupancy.status_markup());
    }

    /// Space separated class attribute value.
    pub fn class_attr(&self) -> String {
        self.classes().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_replaces_free() {
        let mut card = TableCard::rendered("4", Occupancy::Free);
        card.apply(Occupancy::Occupied);

        assert!(card.has_class("occupied"));
        assert!(!card.has_class("free"));
        assert!(card.has_class("table-card"));
        assert!(card.status_html().contains("Ocupada"));
        assert_eq!(card.occupancy(), Some(Occupancy::Occupied));
    }

    #[test]
    fn free_replaces_occupied() {
        let mut card = TableCard::rendered("4", Occupancy::Occupied);
        card.apply(Occupancy::Free);

        assert!(card.has_class("free"));
        assert!(!card.has_class("occupied"));
        assert!(card.status_html().contains("Libre"));
    }

    #[test]
    fn applying_twice_matches_applying_once() {
        let mut once = TableCard::new("9");
        once.apply(Occupancy::Occupied);

        let mut twice = TableCard::new("9");
        twice.apply(Occupancy::Occupied);
        twice.apply(Occupancy::Occupied);

        assert_eq!(once, twice);
        assert_eq!(twice.class_attr(), "occupied table-card");
        assert_eq!(twice.status_html(), OCCUPIED_MARKUP);
    }

    #[test]
    fn bare_card_has_no_occupancy() {
        let card = TableCard::new("1");
        assert_eq!(card.occupancy(), None);
        assert!(card.status_html().is_empty());
    }
}
