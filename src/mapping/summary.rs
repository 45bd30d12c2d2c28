// cross-pair aggregation + the analyzer entry point
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::classify::derived_note;
use crate::core::config::{AnalyzerConfig, Registry};
use crate::core::error::AnalysisError;
use crate::core::types::{EntitySchema, ViewModelSchema};
use crate::mapping::generator::{validate_schemas, AnalysisPlan, SchemaBundle};
use crate::mapping::result::MappingResult;

/// A flattening or computed pattern observed on one view model, kept for later review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternNote {
    pub view_model: String,
    pub property: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub pairs: usize,
    pub matched: usize,
    pub missing_in_entity: usize,
    pub missing_in_view_model: usize,
    pub type_mismatched: usize,
    pub derived: usize,
    pub flattened: usize,
    pub navigation: usize,
}

impl SummaryStats {
    pub fn violations(&self) -> usize {
        self.missing_in_entity + self.missing_in_view_model + self.type_mismatched
    }
}

/// Fold of many [`MappingResult`]s. Catalogs are keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub results: Vec<MappingResult>,
    pub missing_by_entity: BTreeMap<String, Vec<String>>,
    pub flattening_patterns: BTreeMap<String, Vec<PatternNote>>,
    pub computed_patterns: BTreeMap<String, Vec<PatternNote>>,
    pub unpaired_view_models: Vec<String>,
    pub stats: SummaryStats,
}

impl AnalysisSummary {
    //append-only; the caller decides merge order
    pub fn merge(&mut self, result: MappingResult) {
        let missing = self.missing_by_entity.entry(result.entity.clone()).or_default();
        for name in &result.missing_in_entity {
            if !missing.contains(name) {
                missing.push(name.clone());
            }
        }

        for m in result.mappings_of("flattened") {
            self.flattening_patterns
                .entry(result.entity.clone())
                .or_default()
                .push(PatternNote {
                    view_model: result.view_model.clone(),
                    property: m.view_model_property.clone(),
                    note: m.note.clone().unwrap_or_default(),
                });
        }

        for name in &result.derived {
            self.computed_patterns
                .entry(result.entity.clone())
                .or_default()
                .push(PatternNote {
                    view_model: result.view_model.clone(),
                    property: name.clone(),
                    note: derived_note(name),
                });
        }

        let s = &mut self.stats;
        s.pairs += 1;
        s.matched += result.matched.len();
        s.missing_in_entity += result.missing_in_entity.len();
        s.missing_in_view_model += result.missing_in_view_model.len();
        s.type_mismatched += result.type_mismatched.len();
        s.derived += result.derived.len();
        s.flattened += result.flattened.len();
        s.navigation += result.navigation.len();

        self.results.push(result);
    }

    pub fn result(&self, entity: &str, view_model: &str) -> Option<&MappingResult> {
        self.results
            .iter()
            .find(|r| r.entity == entity && r.view_model == view_model)
    }

    pub fn is_consistent(&self) -> bool {
        self.stats.violations() == 0
    }

    pub fn to_toon(&self) -> Result<String, AnalysisError> {
        Ok(toon_format::encode_default(self)?)
    }
}

/// Runs the analysis over every planned pair with a fixed registry.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Registry,
    parallel: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Registry::builtin().clone())
    }
}

impl Analyzer {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            parallel: true,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            registry: config.registry(),
            parallel: config.parallel,
        }
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn analyze_pair(
        &self,
        entity: &EntitySchema,
        view_model: &ViewModelSchema,
    ) -> Result<MappingResult, AnalysisError> {
        let result = MappingResult::analyze(&self.registry, entity, view_model)?;
        tracing::debug!(
            "analyzed {} -> {} ({} mappings, {} violations)",
            result.entity,
            result.view_model,
            result.mappings.len(),
            result.violation_count()
        );
        Ok(result)
    }

    pub fn analyze_bundle(&self, bundle: &SchemaBundle) -> Result<AnalysisSummary, AnalysisError> {
        self.analyze(&bundle.entities, &bundle.view_models)
    }

    /// Analyse every (entity, view model) pair and fold the results.
    ///
    /// Pairs are independent, so workers only compute; the fold below runs on one
    /// thread in plan order, which keeps the summary independent of completion order.
    pub fn analyze(
        &self,
        entities: &[EntitySchema],
        view_models: &[ViewModelSchema],
    ) -> Result<AnalysisSummary, AnalysisError> {
        validate_schemas(entities, view_models)?;
        let plan = AnalysisPlan::build(entities, view_models);
        tracing::info!(
            "mapping analysis started (pairs={}, unpaired={}, parallel={})",
            plan.len(),
            plan.unpaired.len(),
            self.parallel
        );

        let results: Vec<MappingResult> = if self.parallel {
            plan.pairs
                .par_iter()
                .map(|(e, v)| self.analyze_pair(e, v))
                .collect::<Result<Vec<_>, AnalysisError>>()?
        } else {
            plan.pairs
                .iter()
                .map(|(e, v)| self.analyze_pair(e, v))
                .collect::<Result<Vec<_>, AnalysisError>>()?
        };

        let mut summary = AnalysisSummary {
            unpaired_view_models: plan.unpaired.clone(),
            ..AnalysisSummary::default()
        };
        for r in results {
            summary.merge(r);
        }

        tracing::info!(
            "mapping analysis finished (pairs={}, violations={})",
            summary.stats.pairs,
            summary.stats.violations()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PropertyDescriptor, ViewModelCategory};
    use proptest::prelude::*;

    fn mk(name: &str, ty: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, ty)
    }

    fn entities() -> Vec<EntitySchema> {
        vec![
            EntitySchema::new(
                "Order",
                vec![
                    mk("Id", "Guid").inherited(),
                    mk("Number", "string"),
                    mk("Total", "Money").value_object(),
                    mk("Customer", "Customer").navigation(),
                ],
            ),
            EntitySchema::new(
                "Customer",
                vec![
                    mk("Id", "Guid").inherited(),
                    mk("Name", "string"),
                    mk("Address", "Address").value_object(),
                    mk("Age", "int"),
                ],
            ),
        ]
    }

    fn view_models() -> Vec<ViewModelSchema> {
        vec![
            ViewModelSchema::new(
                "OrderRow",
                "Order",
                ViewModelCategory::ListRow,
                vec![
                    mk("Number", "string"),
                    mk("TotalAmount", "decimal"),
                    mk("TotalDisplay", "string").computed(),
                    mk("Badge", "string"),
                ],
            ),
            ViewModelSchema::new(
                "CreateOrder",
                "Order",
                ViewModelCategory::CreationForm,
                vec![mk("Number", "string"), mk("Total", "Money"), mk("Badge", "string")],
            ),
            ViewModelSchema::new(
                "CustomerDetail",
                "Customer",
                ViewModelCategory::DetailView,
                vec![
                    mk("Name", "string"),
                    mk("AddressCity", "string"),
                    mk("Age", "string"),
                ],
            ),
            ViewModelSchema::new("SupplierRow", "Supplier", ViewModelCategory::ListRow, vec![]),
        ]
    }

    #[test]
    fn summary_is_sorted_and_catalogs_patterns() {
        let summary = Analyzer::default().analyze(&entities(), &view_models()).unwrap();

        let keys: Vec<(&str, &str)> = summary
            .results
            .iter()
            .map(|r| (r.entity.as_str(), r.view_model.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Customer", "CustomerDetail"),
                ("Order", "CreateOrder"),
                ("Order", "OrderRow"),
            ]
        );
        assert_eq!(summary.unpaired_view_models, vec!["SupplierRow".to_string()]);

        //Badge is missing on both order view models but catalogued once
        assert_eq!(summary.missing_by_entity["Order"], vec!["Badge".to_string()]);
        assert!(summary.missing_by_entity["Customer"].is_empty());

        let order_flat = &summary.flattening_patterns["Order"];
        assert_eq!(order_flat.len(), 1);
        assert_eq!(order_flat[0].view_model, "OrderRow");
        assert_eq!(order_flat[0].property, "TotalAmount");
        assert!(order_flat[0].note.contains("Total.Amount"));

        assert_eq!(summary.flattening_patterns["Customer"][0].property, "AddressCity");
        assert_eq!(summary.computed_patterns["Order"][0].property, "TotalDisplay");

        assert_eq!(summary.stats.pairs, 3);
        assert_eq!(summary.stats.type_mismatched, 1);
        assert!(!summary.is_consistent());
    }

    #[test]
    fn customer_pair_reports_mismatch_and_unflattened_value_object() {
        let summary = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        let r = summary.result("Customer", "CustomerDetail").unwrap();
        assert_eq!(r.type_mismatched, vec!["Age".to_string()]);
        assert_eq!(r.missing_in_view_model, vec!["Address".to_string()]);
        assert_eq!(r.matched, vec!["Name".to_string()]);
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let par = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        let seq = Analyzer::default()
            .sequential()
            .analyze(&entities(), &view_models())
            .unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn rerun_is_byte_identical() {
        let a = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        let b = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_toon().unwrap(), b.to_toon().unwrap());
    }

    #[test]
    fn input_order_does_not_change_summary() {
        let mut es = entities();
        es.reverse();
        let mut vms = view_models();
        vms.reverse();

        let a = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        let b = Analyzer::default().analyze(&es, &vms).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_descriptor_aborts_the_run() {
        let mut vms = view_models();
        vms[0].properties.push(mk("", "string"));
        let err = Analyzer::default().analyze(&entities(), &vms).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDescriptor { .. }));
    }

    #[test]
    fn unpaired_view_model_with_empty_name_aborts_the_run() {
        let mut vms = view_models();
        //SupplierRow targets an entity that is never supplied
        vms[3].properties.push(mk("", "string"));
        let err = Analyzer::default().analyze(&entities(), &vms).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDescriptor { .. }));
    }

    #[test]
    fn duplicate_entity_name_aborts_the_run() {
        let mut es = entities();
        es.push(EntitySchema::new("Order", vec![mk("Number", "int")]));
        let err = Analyzer::default().analyze(&es, &view_models()).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateSchema { ref schema } if schema == "Order"));
    }

    #[test]
    fn config_registry_reaches_the_analyzer() {
        let mut cfg = AnalyzerConfig::default();
        cfg.parallel = false;
        cfg.value_objects
            .insert("GeoPoint".to_string(), vec!["Latitude".to_string()]);

        let entity = EntitySchema::new("Site", vec![mk("Location", "GeoPoint").value_object()]);
        let vm = ViewModelSchema::new(
            "SiteRow",
            "Site",
            ViewModelCategory::ListRow,
            vec![mk("LocationLatitude", "double")],
        );

        let summary = Analyzer::from_config(&cfg).analyze(&[entity], &[vm]).unwrap();
        assert_eq!(summary.stats.flattened, 1);
        assert!(summary.missing_by_entity["Site"].is_empty());
    }

    #[test]
    fn bundle_entry_point_matches_slices() {
        let bundle = SchemaBundle {
            entities: entities(),
            view_models: view_models(),
        };
        let a = Analyzer::default().analyze_bundle(&bundle).unwrap();
        let b = Analyzer::default().analyze(&entities(), &view_models()).unwrap();
        assert_eq!(a, b);
    }

    const NAMES: &[&str] = &["Id", "Name", "Total", "TotalAmount", "City", "Code", "Count", "Notes"];
    const TYPES: &[&str] = &["int", "string", "decimal?", "Money", "Address", "List<Guid>", "DateTime"];

    fn arb_props() -> impl Strategy<Value = Vec<PropertyDescriptor>> {
        proptest::collection::vec(
            (
                proptest::sample::select(NAMES),
                proptest::sample::select(TYPES),
                any::<[bool; 4]>(),
            ),
            0..8,
        )
        .prop_map(|raw| {
            let mut out: Vec<PropertyDescriptor> = Vec::new();
            for (name, ty, [vo, nav, computed, inherited]) in raw {
                if out.iter().any(|p| p.name == name) {
                    continue;
                }
                let mut p = PropertyDescriptor::new(name, ty);
                p.is_value_object = vo;
                p.is_navigation = nav;
                p.is_computed = computed;
                p.is_inherited = inherited;
                out.push(p);
            }
            out
        })
    }

    proptest! {
        #[test]
        fn analysis_is_idempotent_and_exclusive(e_props in arb_props(), v_props in arb_props()) {
            let entity = EntitySchema::new("Subject", e_props);
            let vm = ViewModelSchema::new("SubjectView", "Subject", ViewModelCategory::Other, v_props);

            let first = Analyzer::default().analyze(&[entity.clone()], &[vm.clone()]).unwrap();
            let second = Analyzer::default().analyze(&[entity], &[vm]).unwrap();
            prop_assert_eq!(&first, &second);

            let r = &first.results[0];
            for name in &r.matched {
                prop_assert!(!r.missing_in_entity.contains(name));
                prop_assert!(!r.missing_in_view_model.contains(name));
            }
        }
    }
}
