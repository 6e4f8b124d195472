//! Merge cart ingredient rows into a printable shopping list.

use std::collections::HashMap;

use crate::domain::types::CartLine;

pub const SHOPPING_LIST_HEADER: &str = "Список покупок:";
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// One distinct `(name, unit)` pair with its summed amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Sum amounts per `(name, unit)`, keeping first-encounter order.
pub fn aggregate<I>(lines: I) -> Vec<ShoppingItem>
where
    I: IntoIterator<Item = CartLine>,
{
    let mut items: Vec<ShoppingItem> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for line in lines {
        let key = (line.name, line.measurement_unit);
        match index.get(&key) {
            Some(&i) => items[i].total += i64::from(line.amount),
            None => {
                index.insert(key.clone(), items.len());
                items.push(ShoppingItem {
                    name: key.0,
                    measurement_unit: key.1,
                    total: i64::from(line.amount),
                });
            }
        }
    }
    items
}

/// Header, blank line, then `• name (unit) — total` per item.
pub fn render(items: &[ShoppingItem]) -> String {
    let mut out = format!("{SHOPPING_LIST_HEADER}\n\n");
    for item in items {
        out.push_str(&format!(
            "• {} ({}) — {}\n",
            item.name, item.measurement_unit, item.total
        ));
    }
    out
}
