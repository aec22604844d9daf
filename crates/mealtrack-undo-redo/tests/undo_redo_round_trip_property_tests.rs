//! Property-based tests for undo/redo round trip
//!
//! For any sequence of edits, undoing all of them restores the starting state,
//! and redo exactly inverts undo.

use mealtrack_undo_redo::{
    ChangeEntry, CollectionField, Field, FieldId, Keyed, Model, SharedHistory, Tracked,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PantryField {
    Label,
    Stock,
    Items,
}

impl FieldId for PantryField {
    const ALL: &'static [Self] = &[PantryField::Label, PantryField::Stock, PantryField::Items];

    fn name(self) -> &'static str {
        match self {
            PantryField::Label => "Label",
            PantryField::Stock => "Stock",
            PantryField::Items => "Items",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Jar {
    id: u32,
    grams: u32,
}

impl Keyed for Jar {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Pantry {
    label: String,
    stock: i64,
    items: Vec<Jar>,
}

impl Model for Pantry {
    type Field = PantryField;
}

fn label() -> Field<Pantry, String> {
    Field::new(PantryField::Label, |p| p.label.clone(), |p, v| p.label = v)
}

fn stock() -> Field<Pantry, i64> {
    Field::new(PantryField::Stock, |p| p.stock, |p, v| p.stock = v)
}

fn items() -> CollectionField<Pantry, Jar> {
    CollectionField::new(PantryField::Items, |p| &p.items, |p| &mut p.items)
}

#[derive(Debug, Clone)]
enum Edit {
    Label(String),
    Stock(i64),
    AddJar(u32),
    RemoveJar(usize),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(Edit::Label),
        (-50i64..50).prop_map(Edit::Stock),
        (1u32..500).prop_map(Edit::AddJar),
        (0usize..8).prop_map(Edit::RemoveJar),
    ]
}

/// Record and perform one edit the way an editor does
fn perform(history: &SharedHistory, pantry: &Tracked<Pantry>, next_id: &mut u32, edit: &Edit) {
    match edit {
        Edit::Label(value) => {
            let old = pantry.with(|p| label().get(p));
            history.record(ChangeEntry::modify(pantry, label(), old, value.clone()));
            pantry.mutate(PantryField::Label, |p| label().set(p, value.clone()));
        }
        Edit::Stock(value) => {
            let old = pantry.with(|p| stock().get(p));
            history.record(ChangeEntry::modify(pantry, stock(), old, *value));
            pantry.mutate(PantryField::Stock, |p| stock().set(p, *value));
        }
        Edit::AddJar(grams) => {
            *next_id += 1;
            let jar = Jar {
                id: *next_id,
                grams: *grams,
            };
            history.record(ChangeEntry::add(pantry, items(), jar.clone()));
            pantry.mutate(PantryField::Items, |p| items().insert(p, jar));
        }
        Edit::RemoveJar(index) => {
            let victim = pantry.with(|p| p.items.get(*index).cloned());
            if let Some(jar) = victim {
                history.record(ChangeEntry::remove(pantry, items(), jar.clone()));
                pantry.mutate(PantryField::Items, |p| {
                    items().remove(p, &jar.id);
                });
            }
        }
    }
}

fn sorted(items: &[Jar]) -> Vec<(u32, u32)> {
    let mut pairs: Vec<(u32, u32)> = items.iter().map(|j| (j.id, j.grams)).collect();
    pairs.sort();
    pairs
}

proptest! {
    /// Undoing every edit returns the model to its starting state
    #[test]
    fn prop_undo_all_restores_start(edits in prop::collection::vec(arb_edit(), 0..30)) {
        let pantry = Tracked::new(Pantry {
            label: "start".to_string(),
            stock: 3,
            items: vec![Jar { id: 0, grams: 100 }],
        });
        let start = pantry.snapshot();
        let history = SharedHistory::new();
        let mut next_id = 0;

        for edit in &edits {
            perform(&history, &pantry, &mut next_id, edit);
        }

        while history.can_undo() {
            history.undo().unwrap();
        }

        let end = pantry.snapshot();
        prop_assert_eq!(&end.label, &start.label);
        prop_assert_eq!(end.stock, start.stock);
        prop_assert_eq!(sorted(&end.items), sorted(&start.items));
        prop_assert!(!history.can_undo());
    }

    /// `undo(); redo();` leaves the model exactly where it was
    #[test]
    fn prop_redo_inverts_undo(edits in prop::collection::vec(arb_edit(), 1..30)) {
        let pantry = Tracked::new(Pantry::default());
        let history = SharedHistory::new();
        let mut next_id = 0;

        for edit in &edits {
            perform(&history, &pantry, &mut next_id, edit);
        }
        prop_assume!(history.can_undo());

        let before = pantry.snapshot();
        history.undo().unwrap();
        history.redo().unwrap();
        let after = pantry.snapshot();

        prop_assert_eq!(&after.label, &before.label);
        prop_assert_eq!(after.stock, before.stock);
        prop_assert_eq!(sorted(&after.items), sorted(&before.items));
        prop_assert!(!history.can_redo());
    }

    /// A new edit after any undo kills the redo tail
    #[test]
    fn prop_new_edit_truncates_redo_tail(
        edits in prop::collection::vec(arb_edit(), 1..20),
        undos in 1usize..20,
        value in -50i64..50,
    ) {
        let pantry = Tracked::new(Pantry::default());
        let history = SharedHistory::new();
        let mut next_id = 0;

        for edit in &edits {
            perform(&history, &pantry, &mut next_id, edit);
        }
        prop_assume!(history.can_undo());

        for _ in 0..undos {
            if history.undo().is_err() {
                break;
            }
        }
        prop_assert!(history.can_redo());

        perform(&history, &pantry, &mut next_id, &Edit::Stock(value));
        prop_assert!(!history.can_redo());
        prop_assert!(history.can_undo());
    }
}
