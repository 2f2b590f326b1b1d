#[cfg(test)]
mod tests {
    use crate::calendar::{build_calendar_grid, navigate_month, YearMonth, GRID_CELLS};
    use chrono::{Datelike, NaiveDate, Weekday};
    use proptest::prelude::*;

    fn weekday_from(index: u8) -> Weekday {
        Weekday::try_from(index % 7).unwrap()
    }

    proptest! {
        // Every month renders as a full six-week grid
        #[test]
        fn test_grid_always_has_42_cells(
            year in 1970i32..2100,
            month in 1u32..=12,
            week_start in 0u8..7,
        ) {
            let ym = YearMonth::new(year, month).unwrap();
            let grid = build_calendar_grid(ym, &[], None, weekday_from(week_start));
            prop_assert_eq!(grid.cells.len(), GRID_CELLS);
        }

        // Current-month cells are exactly 1..=N, in order, with nothing interleaved
        #[test]
        fn test_current_month_days_are_contiguous(
            year in 1970i32..2100,
            month in 1u32..=12,
            week_start in 0u8..7,
        ) {
            let ym = YearMonth::new(year, month).unwrap();
            let grid = build_calendar_grid(ym, &[], None, weekday_from(week_start));

            let first = grid.cells.iter().position(|c| c.is_current_month).unwrap();
            let days: Vec<u32> = grid.cells[first..]
                .iter()
                .take_while(|c| c.is_current_month)
                .map(|c| c.day)
                .collect();
            let expected: Vec<u32> = (1..=ym.days_in_month()).collect();
            prop_assert_eq!(days, expected);
            prop_assert_eq!(grid.current_month_days().count() as u32, ym.days_in_month());
            prop_assert!(first < 7);
        }

        // Availability never leaks into padding cells
        #[test]
        fn test_availability_matches_input(
            year in 1970i32..2100,
            month in 1u32..=12,
            available in proptest::collection::vec(1u32..=31, 0..10),
        ) {
            let ym = YearMonth::new(year, month).unwrap();
            let grid = build_calendar_grid(ym, &available, None, Weekday::Sun);
            for cell in &grid.cells {
                let expected = cell.is_current_month && available.contains(&cell.day);
                prop_assert_eq!(cell.is_available, expected);
            }
        }

        // Navigation always lands on a valid day in the target month
        #[test]
        fn test_navigation_clamps_to_valid_day(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=31,
            delta in -24i32..24,
        ) {
            let ym = YearMonth::new(year, month).unwrap();
            let start = ym.clamped_date(day);
            let moved = navigate_month(start, delta).unwrap();

            let total = year * 12 + month as i32 - 1 + delta;
            prop_assert_eq!(moved.year(), total.div_euclid(12));
            prop_assert_eq!(moved.month() as i32, total.rem_euclid(12) + 1);
            prop_assert_eq!(moved.day(), start.day().min(YearMonth::from_date(moved).days_in_month()));
            prop_assert!(NaiveDate::from_ymd_opt(moved.year(), moved.month(), moved.day()).is_some());
        }
    }
}
