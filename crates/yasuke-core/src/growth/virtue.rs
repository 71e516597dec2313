use serde::Serialize;

/// One of the seven virtues a goal can be dedicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Virtue {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const SAMURAI_VIRTUES: [Virtue; 7] = [
    Virtue {
        id: "rectitude",
        name: "Rectitude (義)",
        description: "Moral uprightness and righteousness in all actions",
    },
    Virtue {
        id: "courage",
        name: "Courage (勇)",
        description: "Bravery in the face of fear and adversity",
    },
    Virtue {
        id: "benevolence",
        name: "Benevolence (仁)",
        description: "Compassion and kindness toward others",
    },
    Virtue {
        id: "respect",
        name: "Respect (礼)",
        description: "Courtesy and honor in all interactions",
    },
    Virtue {
        id: "honesty",
        name: "Honesty (誠)",
        description: "Truthfulness and sincerity in word and deed",
    },
    Virtue {
        id: "honor",
        name: "Honor (名誉)",
        description: "Living with dignity and maintaining reputation",
    },
    Virtue {
        id: "loyalty",
        name: "Loyalty (忠義)",
        description: "Faithfulness to principles and commitments",
    },
];

pub fn find_virtue(id: &str) -> Option<&'static Virtue> {
    SAMURAI_VIRTUES.iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        assert_eq!(find_virtue("courage").unwrap().name, "Courage (勇)");
        assert!(find_virtue("greed").is_none());
    }
}
