//! Reference tables for diagnosis codes and medications.

/// ICD-10 pregnancy codes that carry elevated risk.
pub const HIGH_RISK_PREGNANCY_CODES: [(&str, &str); 10] = [
    ("O24.4", "Gestational diabetes mellitus"),
    ("O13", "Gestational hypertension"),
    ("O14", "Pre-eclampsia"),
    ("O15", "Eclampsia"),
    ("O16", "Unspecified maternal hypertension"),
    ("O26.2", "Pregnancy care for abnormal findings"),
    ("O26.9", "Pregnancy-related condition, unspecified"),
    ("O36.5", "Maternal care for poor fetal growth"),
    ("O09.3", "Supervision of high-risk pregnancy, multigravida"),
    ("O09.5", "Supervision of elderly primigravida"),
];

pub const HIGH_RISK_COMORBIDITY_CODES: [(&str, &str); 6] = [
    ("I10", "Essential hypertension"),
    ("E11.9", "Type 2 diabetes mellitus without complications"),
    ("E03.9", "Hypothyroidism, unspecified"),
    ("J45.9", "Asthma, unspecified"),
    ("D50.9", "Iron deficiency anemia, unspecified"),
    ("E66.9", "Obesity, unspecified"),
];

pub const MEDIUM_RISK_COMORBIDITY_CODES: [(&str, &str); 9] = [
    ("E66.0", "Obesity due to excess calories"),
    ("E66.01", "Morbid obesity due to excess calories"),
    ("E66.09", "Other obesity due to excess calories"),
    ("D50.0", "Iron deficiency anemia secondary to blood loss"),
    ("D50.8", "Other iron deficiency anemias"),
    ("J45.0", "Predominantly allergic asthma"),
    ("J45.1", "Nonallergic asthma"),
    ("J45.8", "Mixed asthma"),
    ("J45.9", "Unspecified asthma"),
];

/// Medications that need close monitoring during pregnancy.
pub const HIGH_RISK_MEDICATIONS: [(&str, &str); 8] = [
    ("Insulin", "Diabetes management - requires close monitoring"),
    ("Labetalol", "Hypertension management - blood pressure monitoring needed"),
    ("Metformin", "Diabetes management - kidney function monitoring"),
    ("Warfarin", "Anticoagulant - bleeding risk"),
    ("Phenytoin", "Antiepileptic - teratogenic risk"),
    ("Lithium", "Mood stabilizer - teratogenic risk"),
    ("ACE inhibitors", "Hypertension - contraindicated in pregnancy"),
    ("ARBs", "Hypertension - contraindicated in pregnancy"),
];

pub const MEDIUM_RISK_MEDICATIONS: [(&str, &str); 5] = [
    ("Levothyroxine", "Thyroid hormone - requires dose adjustment"),
    ("Ferrous sulfate", "Iron supplementation - GI side effects"),
    ("Folic acid", "Prenatal vitamin - generally safe"),
    ("Calcium", "Mineral supplement - generally safe"),
    ("Vitamin D", "Vitamin supplement - generally safe"),
];

pub(crate) fn contains_code(table: &[(&str, &str)], code: &str) -> bool {
    table.iter().any(|(known, _)| *known == code)
}

/// First table entry whose name occurs in `medication`, ignoring case.
pub(crate) fn match_medication<'a>(
    table: &'a [(&'a str, &'a str)],
    medication: &str,
) -> Option<&'a (&'a str, &'a str)> {
    let lower = medication.to_lowercase();
    table
        .iter()
        .find(|(name, _)| lower.contains(&name.to_lowercase()))
}
