use std::collections::BTreeMap;

use rusqlite::params;
use time::Date;

use super::queries::DAYS_CTE;
use super::units::{ClientProfile, RaceUnit, ReportUnit};
use super::{ReportError, ReportService};
use crate::dates::{age_on, format_date, parse_date};
use crate::domain::lookup::category;

/// Members counted by the range-based breakdowns: membership overlaps
/// `(begin, end)`.
const IN_PROGRAM: &str = "member_expiration_date > ?1 AND date_of_membership < ?2";

const UNKNOWN_BIRTH_DATE: &str = "1900-01-01";

fn age_band(age: i32) -> &'static str {
    match age {
        i32::MIN..=5 => "0 to 5 years",
        6..=12 => "6 to 12 years",
        13..=18 => "13 to 18 years",
        19..=29 => "19 to 29 years",
        30..=45 => "30 to 45 years",
        46..=64 => "46 to 64 years",
        65..=84 => "65 to 84 years",
        _ => "85+ years",
    }
}

impl ReportService<'_> {
    fn labeled_counts(
        &self,
        sql: &str,
        begin: Date,
        end: Date,
    ) -> Result<Vec<ReportUnit>, ReportError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![format_date(begin), format_date(end)])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(ReportUnit::labeled(row.get::<_, String>(0)?, row.get(1)?));
        }
        Ok(result)
    }

    /// Per day: active members flagged by `column`.
    fn flagged_by_day(&self, range: &[Date], column: &str) -> Result<Vec<ReportUnit>, ReportError> {
        let (Some(first), Some(last)) = (range.first(), range.last()) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(&format!(
            r#"{DAYS_CTE}
SELECT d,
       (SELECT COUNT(*) FROM workers
         WHERE member_expiration_date > d AND date_of_membership <= d AND {column} = 1)
FROM days
ORDER BY d
"#
        ))?;
        let mut rows = stmt.query(params![format_date(*first), format_date(*last)])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            result.push(ReportUnit::dated(row.get::<_, String>(0)?, row.get(1)?));
        }
        Ok(result)
    }

    pub fn homeless(&self, range: &[Date]) -> Result<Vec<ReportUnit>, ReportError> {
        self.flagged_by_day(range, "homeless")
    }

    pub fn refugee_immigrant(&self, range: &[Date]) -> Result<Vec<ReportUnit>, ReportError> {
        self.flagged_by_day(range, "immigrant_refugee")
    }

    /// Labels read `"Married, With Children"`. Members without a marital
    /// status are left out.
    pub fn household_composition(
        &self,
        begin: Date,
        end: Date,
    ) -> Result<Vec<ReportUnit>, ReportError> {
        self.labeled_counts(
            &format!(
                r#"
SELECT l.text_en || ', ' ||
       CASE WHEN w.live_with_children = 1 THEN 'With Children' ELSE 'Without Children' END
           AS household,
       COUNT(*)
FROM workers w
JOIN lookups l ON l.id = w.marital_status
WHERE {IN_PROGRAM}
GROUP BY household
ORDER BY household
"#
            ),
            begin,
            end,
        )
    }

    /// Income bands relative to area median, smallest group first.
    pub fn income(&self, begin: Date, end: Date) -> Result<Vec<ReportUnit>, ReportError> {
        self.labeled_counts(
            &format!(
                r#"
SELECT CASE
         WHEN l.text_en = 'Less than $15,000' THEN 'Very low (< 30% median)'
         WHEN l.text_en = 'Between $15,000 and $25,000' THEN 'Moderate (> 50% median)'
         WHEN l.text_en != 'unknown' THEN 'Above moderate (> 80% median)'
         ELSE 'Unknown'
       END AS band,
       COUNT(*) AS members
FROM workers w
JOIN lookups l ON l.id = w.income_id
WHERE {IN_PROGRAM}
GROUP BY band
ORDER BY members, band
"#
            ),
            begin,
            end,
        )
    }

    /// Age bands as of `end`. A missing or placeholder birth date is
    /// reported as `Unknown`.
    pub fn worker_age(&self, begin: Date, end: Date) -> Result<Vec<ReportUnit>, ReportError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT date_of_birth FROM workers WHERE {IN_PROGRAM}"
        ))?;
        let mut rows = stmt.query(params![format_date(begin), format_date(end)])?;
        let mut bands: BTreeMap<&'static str, i64> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let born: Option<String> = row.get(0)?;
            let band = match born.as_deref() {
                None | Some(UNKNOWN_BIRTH_DATE) => "Unknown",
                Some(raw) => age_band(age_on(parse_date(raw)?, end)),
            };
            *bands.entry(band).or_insert(0) += 1;
        }
        Ok(bands
            .into_iter()
            .map(|(band, count)| ReportUnit::labeled(band, count))
            .collect())
    }

    pub fn gender(&self, begin: Date, end: Date) -> Result<Vec<ReportUnit>, ReportError> {
        self.labeled_counts(
            &format!(
                r#"
SELECT l.text_en, COUNT(*)
FROM workers w
JOIN lookups l ON l.id = w.gender_id
WHERE {IN_PROGRAM}
GROUP BY l.id
ORDER BY l.sort_order, l.id
"#
            ),
            begin,
            end,
        )
    }

    pub fn disability(&self, begin: Date, end: Date) -> Result<Vec<ReportUnit>, ReportError> {
        self.labeled_counts(
            &format!(
                r#"
SELECT CASE WHEN disabled = 1 THEN 'Yes' ELSE 'No' END AS answer, COUNT(*)
FROM workers
WHERE {IN_PROGRAM}
GROUP BY answer
ORDER BY answer
"#
            ),
            begin,
            end,
        )
    }

    pub fn english_level(&self, begin: Date, end: Date) -> Result<Vec<ReportUnit>, ReportError> {
        self.labeled_counts(
            &format!(
                r#"
SELECT 'English ' || english_level AS level, COUNT(*)
FROM workers
WHERE {IN_PROGRAM}
GROUP BY level
ORDER BY level
"#
            ),
            begin,
            end,
        )
    }

    /// Per day: active members for every race in the lookup table, zero
    /// included.
    pub fn race_ethnicity(&self, range: &[Date]) -> Result<Vec<RaceUnit>, ReportError> {
        let (Some(first), Some(last)) = (range.first(), range.last()) else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(&format!(
            r#"{DAYS_CTE}
SELECT days.d, l.text_en, COUNT(w.id)
FROM days
CROSS JOIN lookups l
LEFT JOIN workers w
       ON w.race_id = l.id
      AND w.member_expiration_date > days.d
      AND w.date_of_membership <= days.d
WHERE l.category = ?3
GROUP BY days.d, l.id
ORDER BY days.d
"#
        ))?;
        let mut rows = stmt.query(params![
            format_date(*first),
            format_date(*last),
            category::RACE
        ])?;
        let mut result: Vec<RaceUnit> = Vec::new();
        while let Some(row) = rows.next()? {
            let date: String = row.get(0)?;
            let race: String = row.get(1)?;
            let count: i64 = row.get(2)?;
            match result.last_mut() {
                Some(unit) if unit.date == date => {
                    unit.counts.insert(race, count);
                }
                _ => result.push(RaceUnit {
                    date,
                    counts: BTreeMap::from([(race, count)]),
                }),
            }
        }
        Ok(result)
    }

    /// Every demographic breakdown for members in the program during
    /// `[begin, end]`.
    pub fn client_profile(&self, begin: Date, end: Date) -> Result<ClientProfile, ReportError> {
        let range = super::date_range(begin, end)?;
        tracing::debug!(begin = %format_date(begin), end = %format_date(end), "building client profile");
        Ok(ClientProfile {
            begin: format_date(begin),
            end: format_date(end),
            homeless: self.homeless(&range)?,
            household_composition: self.household_composition(begin, end)?,
            income: self.income(begin, end)?,
            age: self.worker_age(begin, end)?,
            gender: self.gender(begin, end)?,
            disability: self.disability(begin, end)?,
            race: self.race_ethnicity(&range)?,
            refugee_immigrant: self.refugee_immigrant(&range)?,
            english_level: self.english_level(begin, end)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::age_band;

    #[test]
    fn age_bands_close_on_upper_bound() {
        assert_eq!(age_band(5), "0 to 5 years");
        assert_eq!(age_band(6), "6 to 12 years");
        assert_eq!(age_band(18), "13 to 18 years");
        assert_eq!(age_band(29), "19 to 29 years");
        assert_eq!(age_band(45), "30 to 45 years");
        assert_eq!(age_band(64), "46 to 64 years");
        assert_eq!(age_band(84), "65 to 84 years");
        assert_eq!(age_band(85), "85+ years");
    }
}
