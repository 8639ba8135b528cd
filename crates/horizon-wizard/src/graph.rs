//! The page graph builder.
//!
//! Walks a [`WizardDefinition`] in order and produces the *current* list of
//! visible pages plus the global components. A panel whose condition is
//! false is omitted entirely: its fields are not constructed, do not
//! validate, and hold no state until a later rebuild shows it again. The
//! data they control is left untouched.
//!
//! Building is the only place field components are created. A failed build
//! destroys whatever it had created; a graph that is replaced must be
//! [`destroy`](PageGraph::destroy)ed by its owner.

use serde_json::Value;

use crate::component::{ComponentFactory, ComponentOptions, FieldComponent};
use crate::definition::{Item, PanelDefinition, WizardDefinition};
use crate::error::DefinitionError;
use crate::evaluator::{BranchExpression, Condition, ConditionContext, Evaluator};

/// Identifies a panel by its position among the definition's items.
pub type PanelId = usize;

/// One visible page.
#[derive(Debug)]
pub struct Page {
    key: String,
    title: String,
    index: usize,
    panel: PanelId,
    condition: Option<Condition>,
    next_page: Option<BranchExpression>,
    components: Vec<Box<dyn FieldComponent>>,
}

impl Page {
    /// The page key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The page title (falls back to the key).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Index in the visible-pages list when the page was built.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Item position of the panel this page was built from.
    pub fn panel(&self) -> PanelId {
        self.panel
    }

    /// The visibility condition.
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// The branch expression.
    pub fn next_page(&self) -> Option<&BranchExpression> {
        self.next_page.as_ref()
    }

    /// The page's field components.
    pub fn components(&self) -> &[Box<dyn FieldComponent>] {
        &self.components
    }

    /// Mutable access to the page's field components.
    pub fn components_mut(&mut self) -> &mut [Box<dyn FieldComponent>] {
        &mut self.components
    }

    fn destroy(&mut self) {
        for component in &mut self.components {
            component.destroy();
        }
        self.components.clear();
    }
}

/// The visible pages and global components of one build generation.
#[derive(Debug, Default)]
pub struct PageGraph {
    pages: Vec<Page>,
    globals: Vec<Box<dyn FieldComponent>>,
    visible: Vec<PanelId>,
}

impl PageGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible pages, in definition order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to the visible pages.
    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// The page at `index`.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Global components.
    pub fn globals(&self) -> &[Box<dyn FieldComponent>] {
        &self.globals
    }

    /// Number of visible pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether there are no visible pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// The visible panel signature this graph was built from.
    pub fn visible_panels(&self) -> &[PanelId] {
        &self.visible
    }

    /// Index of the first page with `key`, or 0 when none matches.
    pub fn page_index_by_key(&self, key: &str) -> usize {
        self.pages
            .iter()
            .position(|page| page.key == key)
            .unwrap_or(0)
    }

    /// Split borrow of one page and the global components.
    pub fn page_and_globals_mut(
        &mut self,
        index: usize,
    ) -> (Option<&mut Page>, &mut [Box<dyn FieldComponent>]) {
        (self.pages.get_mut(index), &mut self.globals)
    }

    /// Split borrow of all pages and the global components.
    pub fn pages_and_globals_mut(&mut self) -> (&mut [Page], &mut [Box<dyn FieldComponent>]) {
        (&mut self.pages, &mut self.globals)
    }

    /// Tear down every component and empty the graph.
    pub fn destroy(&mut self) {
        let count = self
            .pages
            .iter()
            .map(|page| page.components.len())
            .sum::<usize>()
            + self.globals.len();
        for page in &mut self.pages {
            page.destroy();
        }
        for component in &mut self.globals {
            component.destroy();
        }
        self.pages.clear();
        self.globals.clear();
        self.visible.clear();
        tracing::trace!(
            target: "horizon_wizard::graph",
            components = count,
            "page graph destroyed"
        );
    }
}

/// Builds [`PageGraph`]s from a definition.
///
/// # Example
///
/// ```
/// use horizon_wizard::component::BasicFieldFactory;
/// use horizon_wizard::definition::{PanelDefinition, WizardDefinition};
/// use horizon_wizard::evaluator::{BasicEvaluator, Condition};
/// use horizon_wizard::graph::PageGraphBuilder;
/// use serde_json::json;
///
/// let definition = WizardDefinition::new("Order")
///     .panel(PanelDefinition::new("items", "Items"))
///     .panel(PanelDefinition::new("gift", "Gift wrap")
///         .with_condition(Condition::simple(true, "gift", true)))
///     .panel(PanelDefinition::new("pay", "Payment"));
///
/// let builder = PageGraphBuilder::new(&definition, &BasicEvaluator, &BasicFieldFactory);
/// let graph = builder.build(&json!({"gift": false})).unwrap();
/// let keys: Vec<_> = graph.pages().iter().map(|p| p.key()).collect();
/// assert_eq!(keys, ["items", "pay"]);
/// ```
pub struct PageGraphBuilder<'a> {
    definition: &'a WizardDefinition,
    evaluator: &'a dyn Evaluator,
    factory: &'a dyn ComponentFactory,
    read_only: bool,
}

impl<'a> PageGraphBuilder<'a> {
    /// Create a builder.
    pub fn new(
        definition: &'a WizardDefinition,
        evaluator: &'a dyn Evaluator,
        factory: &'a dyn ComponentFactory,
    ) -> Self {
        Self {
            definition,
            evaluator,
            factory,
            read_only: false,
        }
    }

    /// Tell components the form is read-only.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    fn is_visible(&self, panel: &PanelDefinition, position: usize, data: &Value) -> bool {
        let Some(condition) = &panel.conditional else {
            return true;
        };
        let key = panel.page_key(position);
        let ctx = ConditionContext {
            data,
            item_key: Some(&key),
        };
        self.evaluator.check_condition(condition, &ctx)
    }

    /// Positions of the panels whose condition currently holds.
    ///
    /// Does not construct any component.
    pub fn visible_panels(&self, data: &Value) -> Vec<PanelId> {
        self.definition
            .components
            .iter()
            .enumerate()
            .filter_map(|(position, item)| match item {
                Item::Panel(panel) if self.is_visible(panel, position, data) => Some(position),
                Item::Panel(_) | Item::Hidden(_) => None,
            })
            .collect()
    }

    /// Build a fresh graph against `data`.
    ///
    /// When a component cannot be created, the components built so far are
    /// destroyed before the error is returned.
    pub fn build(&self, data: &Value) -> Result<PageGraph, DefinitionError> {
        let mut graph = PageGraph::new();
        if let Err(err) = self.populate(&mut graph, data) {
            graph.destroy();
            return Err(err);
        }

        tracing::debug!(
            target: "horizon_wizard::graph",
            pages = graph.pages.len(),
            globals = graph.globals.len(),
            "page graph built"
        );
        Ok(graph)
    }

    fn populate(&self, graph: &mut PageGraph, data: &Value) -> Result<(), DefinitionError> {
        for (position, item) in self.definition.components.iter().enumerate() {
            match item {
                Item::Panel(panel) => {
                    if !self.is_visible(panel, position, data) {
                        tracing::trace!(
                            target: "horizon_wizard::graph",
                            position,
                            "panel hidden by condition"
                        );
                        continue;
                    }
                    let index = graph.pages.len();
                    let key = panel.page_key(position);
                    graph.pages.push(Page {
                        title: panel.title.clone().unwrap_or_else(|| key.clone()),
                        key,
                        index,
                        panel: position,
                        condition: panel.conditional.clone(),
                        next_page: panel.next_page.clone(),
                        components: Vec::with_capacity(panel.components.len()),
                    });
                    graph.visible.push(position);

                    let options = ComponentOptions::page(index, self.read_only);
                    for field in &panel.components {
                        let component = self.factory.create_component(field, &options)?;
                        graph.pages[index].components.push(component);
                    }
                }
                Item::Hidden(field) => {
                    let options = ComponentOptions::global(self.read_only);
                    graph
                        .globals
                        .push(self.factory.create_component(field, &options)?);
                }
            }
        }
        Ok(())
    }
}
