//! Row-to-domain conversions and table naming per parent kind.

use edutrack_shared::{
    EdutrackError, EducationInfo, FamilyMember, Official, ParentKind, Politician, Result,
};

/// Table and column names for one parent kind and its family table.
pub(crate) struct Tables {
    pub parent: &'static str,
    pub family: &'static str,
    pub foreign_key: &'static str,
}

pub(crate) fn tables(kind: ParentKind) -> Tables {
    match kind {
        ParentKind::Official => Tables {
            parent: "officials",
            family: "official_family",
            foreign_key: "official_id",
        },
        ParentKind::Politician => Tables {
            parent: "politicians",
            family: "politician_family",
            foreign_key: "politician_id",
        },
    }
}

pub(crate) fn storage_err(e: libsql::Error) -> EdutrackError {
    EdutrackError::Storage(e.to_string())
}

/// Whether a write failed on one of the schema's UNIQUE constraints.
pub(crate) fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

fn text(row: &libsql::Row, idx: i32) -> Result<String> {
    row.get::<String>(idx).map_err(storage_err)
}

fn int(row: &libsql::Row, idx: i32) -> Result<i64> {
    row.get::<i64>(idx).map_err(storage_err)
}

/// Education columns in the fixed order `education_location, university, degree_level`.
fn education(row: &libsql::Row, start: i32) -> Result<EducationInfo> {
    Ok(EducationInfo {
        education_location: text(row, start)?,
        university: text(row, start + 1)?,
        degree_level: text(row, start + 2)?,
    })
}

/// `id, name, department, joining_year, <education>`
pub(crate) fn row_to_official(row: &libsql::Row) -> Result<Official> {
    let joining_year = int(row, 3)?;
    Ok(Official {
        id: int(row, 0)?,
        name: text(row, 1)?,
        department: text(row, 2)?,
        joining_year: i32::try_from(joining_year)
            .map_err(|_| EdutrackError::Storage(format!("invalid joining year: {joining_year}")))?,
        education: education(row, 4)?,
    })
}

/// `id, name, party, position, <education>`
pub(crate) fn row_to_politician(row: &libsql::Row) -> Result<Politician> {
    Ok(Politician {
        id: int(row, 0)?,
        name: text(row, 1)?,
        party: text(row, 2)?,
        position: text(row, 3)?,
        education: education(row, 4)?,
    })
}

/// `id, parent_id, parent_name, name, relation_type, <education>`
pub(crate) fn row_to_family_member(row: &libsql::Row) -> Result<FamilyMember> {
    Ok(FamilyMember {
        id: int(row, 0)?,
        parent_id: int(row, 1)?,
        parent_name: text(row, 2)?,
        name: text(row, 3)?,
        relation_type: text(row, 4)?,
        education: education(row, 5)?,
    })
}
