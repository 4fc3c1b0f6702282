//! Associations contribute properties to the classes they join, and take
//! them back when their unit goes away.

use weft_tests::prelude::*;

const PRODUCT: &str = "Class Product{name:String[1];}";
const SYNONYM: &str = "Class Synonym{name:String[1];}";
const PROD_SYN: &str = "Association ProdSyn{product:Product[1]; synonyms:Synonym[*];}";

mod delete_association {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("delete_association")
            .add("product.pure", PRODUCT)
            .add("synonym.pure", SYNONYM)
            .step("compile_classes", |a| a.succeeds().snapshot("classes"))
            .add("prodsyn.pure", PROD_SYN)
            .step("compile_association", |a| {
                a.succeeds()
                    .defines("ProdSyn")
                    .has_property("Product", "synonyms")
                    .has_property("Synonym", "product")
            })
            .delete("prodsyn.pure")
            .step("delete_association", |a| {
                a.succeeds()
                    .lacks("ProdSyn")
                    .lacks_property("Product", "synonyms")
                    .lacks_property("Synonym", "product")
                    .matches_snapshot("classes")
            })
    }

    #[test]
    fn test_deleting_association_restores_classes() {
        // GIVEN: two classes compiled, then an association joining them

        // WHEN: the association's unit is deleted

        // THEN: neither class exposes association properties and the graph
        // is back to its pre-association form
        init_tracing();
        scenario().run().unwrap();
    }
}

mod replace_class {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("replace_class")
            .add("product.pure", PRODUCT)
            .add("synonym.pure", SYNONYM)
            .add("prodsyn.pure", PROD_SYN)
            .step("compile_all", |a| a.succeeds().snapshot("all"))
            .add("product.pure", "Class Product{name:String[1]; sku:String[0..1];}")
            .step("replace_product", |a| {
                a.succeeds()
                    .has_property("Product", "sku")
                    .has_property("Product", "synonyms")
                    .has_property("Synonym", "product")
            })
            .add("product.pure", PRODUCT)
            .step("restore_product", |a| a.succeeds().matches_snapshot("all"))
    }

    #[test]
    fn test_replacing_joined_class_rebinds_association() {
        // GIVEN: an association between two compiled classes

        // WHEN: one of the classes is replaced, then restored

        // THEN: the association is processed again against the new class
        // and the restored graph equals the original
        scenario().run().unwrap();
    }
}

mod delete_joined_class {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("delete_joined_class")
            .add("product.pure", PRODUCT)
            .add("synonym.pure", SYNONYM)
            .add("prodsyn.pure", PROD_SYN)
            .step("compile_all", |a| a.succeeds())
            .delete("synonym.pure")
            .step("delete_synonym", |a| {
                a.error("Synonym has not been defined!")
                    .error_at("prodsyn.pure", 1)
                    .lacks("Synonym")
                    .lacks_property("Product", "synonyms")
            })
            .add("synonym.pure", SYNONYM)
            .step("restore_synonym", |a| {
                a.succeeds()
                    .has_property("Product", "synonyms")
                    .has_property("Synonym", "product")
            })
    }

    #[test]
    fn test_deleting_joined_class_breaks_association() {
        // GIVEN: an association between two compiled classes

        // WHEN: one class is deleted

        // THEN: the association no longer resolves, and the failed batch
        // compiles once the class is back
        scenario().run().unwrap();
    }
}
