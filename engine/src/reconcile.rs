use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::ContainedMatchType;

/// What a rendered view is showing. Any change here means the old view is
/// hidden and the new one built from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderScope {
    Elimination { group_id: String, contained: Option<ContainedMatchType> },
    RoundRobin { group_id: String, grid_size: usize },
    Swiss { group_id: String, round_number: Option<u32> },
}

/// A text slot inside one visual unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    TopTeamName,
    TopScore,
    BottomTeamName,
    BottomScore,
    /// Round-robin header.
    TeamName,
    /// Round-robin pairing, row team's score.
    LeftScore,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::TopTeamName => "top team",
            Field::TopScore => "top score",
            Field::BottomTeamName => "bottom team",
            Field::BottomScore => "bottom score",
            Field::TeamName => "team",
            Field::LeftScore => "left score",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Created without a value transition; only the view reveal applies.
    Enter,
    /// Text changed since the last render.
    Update,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAction {
    /// Match id, or grid position for round-robin cells.
    pub id: String,
    pub field: Field,
    pub kind: ActionKind,
    pub old_value: Option<String>,
    pub new_value: String,
}

/// Formatted text of one field as the engine would render it now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub id: String,
    pub field: Field,
    pub value: String,
}

impl RenderedField {
    pub fn new(id: impl Into<String>, field: Field, value: impl Into<String>) -> Self {
        Self { id: id.into(), field, value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// The previous view must be torn down before this one is revealed.
    pub rebuild: bool,
    /// One action per rendered field, in render order.
    pub actions: Vec<FieldAction>,
}

impl Reconciliation {
    pub fn updates(&self) -> impl Iterator<Item = &FieldAction> {
        self.actions.iter().filter(|a| a.kind == ActionKind::Update)
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// Current text of a field, whatever happened to it.
    pub fn text(&self, id: &str, field: Field) -> Option<&str> {
        self.actions.iter().find(|a| a.id == id && a.field == field).map(|a| a.new_value.as_str())
    }
}

/// Everything the engine remembers between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousRenderState {
    scope: Option<RenderScope>,
    fields: HashMap<(String, Field), String>,
}

impl PreviousRenderState {
    pub fn scope(&self) -> Option<&RenderScope> {
        self.scope.as_ref()
    }

    pub fn text(&self, id: &str, field: Field) -> Option<&str> {
        self.fields.get(&(id.to_string(), field)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scope.is_none()
    }
}

/// Diffs freshly formatted fields against the previous render.
///
/// Nothing is mutated; the returned state replaces `prev` once the caller has
/// applied the actions.
pub fn reconcile(prev: &PreviousRenderState, scope: RenderScope, fields: Vec<RenderedField>) -> (Reconciliation, PreviousRenderState) {
    let rebuild = prev.scope.as_ref() != Some(&scope);
    if rebuild {
        debug!("render scope changed from {:?} to {:?}; rebuilding", prev.scope, scope);
    }

    let mut actions = Vec::with_capacity(fields.len());
    let mut next = HashMap::with_capacity(fields.len());

    for RenderedField { id, field, value } in fields {
        let key = (id, field);
        let previous = if rebuild { None } else { prev.fields.get(&key) };

        let (kind, old_value) = match previous {
            None => (ActionKind::Enter, None),
            Some(old) if *old == value => (ActionKind::Unchanged, None),
            Some(old) => (ActionKind::Update, Some(old.clone())),
        };

        actions.push(FieldAction { id: key.0.clone(), field, kind, old_value, new_value: value.clone() });
        next.insert(key, value);
    }

    let reconciliation = Reconciliation { rebuild, actions };
    if !rebuild {
        debug!(
            "keyed update: {} entered, {} updated, {} unchanged",
            reconciliation.count(ActionKind::Enter),
            reconciliation.count(ActionKind::Update),
            reconciliation.count(ActionKind::Unchanged)
        );
    }

    (reconciliation, PreviousRenderState { scope: Some(scope), fields: next })
}
