//! CSS class renaming.
//!
//! Looks every class refiner up through the job's substitution map. The
//! pass knows nothing about renaming strategy; determinism and
//! repeatability are the map's contract.

use cascada_core::diagnostics::ErrorManager;
use cascada_core::ident::Name;
use cascada_core::node::NodeKind;
use cascada_core::tree::{NodeId, Tree};
use cascada_core::visit::VisitController;
use cascada_core::visitor::Visitor;

use crate::rename::SubstitutionMap;

/// Rewrites class refiners through a substitution map.
pub struct RenameClasses;

impl RenameClasses {
    pub fn run(tree: &mut Tree, _errors: &mut ErrorManager, map: &mut dyn SubstitutionMap) {
        let mut visitor = RenameVisitor { map };
        VisitController::new(tree).start_visit(&mut visitor);
    }
}

struct RenameVisitor<'m> {
    map: &'m mut dyn SubstitutionMap,
}

impl Visitor for RenameVisitor<'_> {
    fn enter_class_refiner(&mut self, ctl: &mut VisitController<'_>, id: NodeId) -> bool {
        let NodeKind::ClassRefiner { name } = ctl.tree().kind(id) else {
            return true;
        };
        let replacement = self.map.get(&name.resolve());
        let NodeKind::ClassRefiner { name } = ctl.tree_mut().kind_mut(id) else {
            unreachable!("kind checked above");
        };
        *name = Name::new(&replacement);
        true
    }
}
