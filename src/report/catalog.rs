use super::{GroupSpec, NullPolicy, PreFilter, RecordScope, ReportDefinition, ReportKind, SortOrder};
use crate::data::model::Field;

const ADMITTED: PreFilter = PreFilter {
    column: "kodsebabkeluar",
    equals: "ADMIT",
};

const DISCHARGED: PreFilter = PreFilter {
    column: "kodsebabkeluar",
    equals: "HOME",
};

fn counted(column: Field, pre_filter: Option<PreFilter>, nulls: NullPolicy, limit: Option<usize>) -> ReportKind {
    ReportKind::GroupCount(GroupSpec {
        column: column.header(),
        pre_filter,
        nulls,
        order: SortOrder::CountDescending,
        limit,
    })
}

/// Every report on the dashboard, in display order.
/// `top_n` bounds the "most common diagnoses" tables.
pub fn catalog(top_n: usize) -> Vec<ReportDefinition> {
    vec![
        ReportDefinition {
            id: "total_procedures",
            title: "Total Patient Perform CT Scan".into(),
            category_label: "CTscanProsedure",
            scope: RecordScope::Filtered,
            kind: ReportKind::NonNullCount {
                column: Field::CtScanProcedure.header(),
            },
        },
        ReportDefinition {
            id: "total_scans",
            title: "Total CT Scan Perform".into(),
            category_label: "bil_ctscan",
            scope: RecordScope::Filtered,
            kind: ReportKind::Sum {
                column: Field::ScanCount.header(),
            },
        },
        // Reads the whole upload, not the filtered view.
        ReportDefinition {
            id: "ct_type_frequency",
            title: "Frequency of CT Scan Types".into(),
            category_label: "CT Scan Type",
            scope: RecordScope::Loaded,
            kind: ReportKind::Melt {
                columns: Field::CT_TYPES.iter().map(|f| f.header()).collect(),
            },
        },
        ReportDefinition {
            id: "scans_per_visit",
            title: "Frequency Distribution of Patient Perform CT Scan on Visit".into(),
            category_label: "bil_ctscan",
            scope: RecordScope::Filtered,
            kind: ReportKind::GroupCount(GroupSpec {
                column: Field::ScanCount.header(),
                pre_filter: None,
                nulls: NullPolicy::Drop,
                order: SortOrder::CategoryAscending,
                limit: None,
            }),
        },
        ReportDefinition {
            id: "admit_ward",
            title: "Ward Placement for Admitted Patients".into(),
            category_label: "admitward",
            scope: RecordScope::Filtered,
            kind: counted(Field::AdmitWard, Some(ADMITTED), NullPolicy::Drop, None),
        },
        ReportDefinition {
            id: "admit_ward_with_unknown",
            title: "Ward Placement for Admitted Patients (including unrecorded ward)".into(),
            category_label: "admitward",
            scope: RecordScope::Filtered,
            kind: counted(Field::AdmitWard, Some(ADMITTED), NullPolicy::Unknown, None),
        },
        ReportDefinition {
            id: "top_diagnoses_admitted",
            title: format!("Top {top_n} Most Common Primary Diagnoses for Ordering CT Scans (Admitted Patients)"),
            category_label: "PDx",
            scope: RecordScope::Filtered,
            kind: counted(Field::PrimaryDiagnosis, Some(ADMITTED), NullPolicy::Drop, Some(top_n)),
        },
        ReportDefinition {
            id: "top_diagnoses_discharged",
            title: format!("Top {top_n} Most Common Primary Diagnoses for Ordering CT Scans (Discharge Patients)"),
            category_label: "PDx",
            scope: RecordScope::Filtered,
            kind: counted(Field::PrimaryDiagnosis, Some(DISCHARGED), NullPolicy::Drop, Some(top_n)),
        },
        ReportDefinition {
            id: "admission_status",
            title: "Admission Status of Patients after CT Scan".into(),
            category_label: "kodsebabkeluar",
            scope: RecordScope::Filtered,
            kind: counted(Field::DischargeCode, None, NullPolicy::Unknown, None),
        },
        ReportDefinition {
            id: "specialty",
            title: "CT Scan Requests by Specialty".into(),
            category_label: "specialty",
            scope: RecordScope::Filtered,
            kind: counted(Field::Specialty, None, NullPolicy::Unknown, None),
        },
        ReportDefinition {
            id: "specialty_admitted",
            title: "Specialty of Admitted Patients".into(),
            category_label: "specialty",
            scope: RecordScope::Filtered,
            kind: counted(Field::Specialty, Some(ADMITTED), NullPolicy::Drop, None),
        },
    ]
}
