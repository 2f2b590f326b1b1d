#[cfg(test)]
mod tests {
    use crate::calendar::{
        build_calendar_grid, can_navigate_back, days_in_month, navigate_month, CalendarNavigator,
        CalendarSettings, NavigationError, YearMonth, GRID_CELLS,
    };
    use chrono::{NaiveDate, Weekday};
    use estately_config::SchedulingConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_june_2024_grid_sunday_start() {
        // 1 June 2024 is a Saturday: six trailing May days first
        let month = YearMonth::new(2024, 6).unwrap();
        let grid = build_calendar_grid(month, &[5, 12, 20], None, Weekday::Sun);

        assert_eq!(grid.cells.len(), GRID_CELLS);
        let leading: Vec<u32> = grid.cells[..6].iter().map(|c| c.day).collect();
        assert_eq!(leading, vec![26, 27, 28, 29, 30, 31]);
        assert!(grid.cells[..6].iter().all(|c| !c.is_current_month));
        assert_eq!(grid.cells[6].day, 1);
        assert!(grid.cells[6].is_current_month);

        // 6 + 30 = 36, six days of July fill the last row
        let trailing: Vec<u32> = grid.cells[36..].iter().map(|c| c.day).collect();
        assert_eq!(trailing, vec![1, 2, 3, 4, 5, 6]);
        assert!(grid.cells[36..].iter().all(|c| !c.is_current_month && !c.is_available));
    }

    #[test]
    fn test_only_listed_days_are_available() {
        let month = YearMonth::new(2024, 6).unwrap();
        let grid = build_calendar_grid(month, &[5, 12, 20], None, Weekday::Sun);

        let available: Vec<u32> = grid
            .current_month_days()
            .filter(|c| c.is_available)
            .map(|c| c.day)
            .collect();
        assert_eq!(available, vec![5, 12, 20]);
        // padding days share numbers with available days but are never marked
        assert!(grid.cells.iter().filter(|c| !c.is_current_month).all(|c| !c.is_available));
    }

    #[test]
    fn test_monday_start_shifts_offset() {
        // 1 September 2024 is a Sunday: no padding with Sunday start, six with Monday start
        let month = YearMonth::new(2024, 9).unwrap();
        let sunday = build_calendar_grid(month, &[], None, Weekday::Sun);
        let monday = build_calendar_grid(month, &[], None, Weekday::Mon);

        assert_eq!(sunday.cells[0].day, 1);
        assert!(sunday.cells[0].is_current_month);
        assert_eq!(monday.cells[6].day, 1);
        assert_eq!(monday.cells[0].day, 26);
        assert_eq!(monday.rows().count(), 6);
    }

    #[test]
    fn test_selection_only_marks_matching_month() {
        let month = YearMonth::new(2024, 6).unwrap();
        let grid = build_calendar_grid(month, &[10], Some(date(2024, 6, 10)), Weekday::Sun);
        assert!(grid.cell_for_day(10).unwrap().is_selected);
        assert_eq!(grid.cells.iter().filter(|c| c.is_selected).count(), 1);

        let other = build_calendar_grid(month, &[10], Some(date(2024, 7, 10)), Weekday::Sun);
        assert!(other.cells.iter().all(|c| !c.is_selected));
    }

    #[test]
    fn test_navigate_month_clamps_day() {
        assert_eq!(navigate_month(date(2023, 3, 31), -1), Some(date(2023, 2, 28)));
        assert_eq!(navigate_month(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(navigate_month(date(2024, 12, 15), 1), Some(date(2025, 1, 15)));
        assert_eq!(navigate_month(date(2024, 1, 15), -13), Some(date(2022, 12, 15)));
    }

    #[test]
    fn test_cannot_navigate_into_the_past() {
        let today = date(2024, 6, 15);
        assert!(!can_navigate_back(YearMonth::new(2024, 6).unwrap(), today));
        assert!(!can_navigate_back(YearMonth::new(2024, 5).unwrap(), today));
        assert!(can_navigate_back(YearMonth::new(2024, 7).unwrap(), today));
    }

    #[test]
    fn test_navigator_refuses_past_month() {
        let today = date(2024, 6, 15);
        let mut navigator = CalendarNavigator::new(today);
        assert_eq!(navigator.previous(today), Err(NavigationError::PastMonth));
        assert_eq!(navigator.displayed_month(), YearMonth::new(2024, 6).unwrap());

        navigator.next().unwrap();
        assert!(navigator.can_go_back(today));
        assert_eq!(navigator.previous(today).unwrap(), YearMonth::new(2024, 6).unwrap());

        assert_eq!(
            navigator.show(YearMonth::new(2024, 1).unwrap(), today),
            Err(NavigationError::PastMonth)
        );
    }

    #[test]
    fn test_navigator_keeps_clamped_cursor() {
        let today = date(2024, 1, 2);
        let mut navigator = CalendarNavigator::new(date(2024, 1, 31));
        navigator.next().unwrap();
        assert_eq!(navigator.cursor(), date(2024, 2, 29));
        navigator.show(YearMonth::new(2024, 4).unwrap(), today).unwrap();
        assert_eq!(navigator.cursor(), date(2024, 4, 29));
    }

    #[test]
    fn test_settings_from_config() {
        let config = SchedulingConfig {
            time_zone: Some("Asia/Kolkata".to_string()),
            week_starts_on: Some("Mon".to_string()),
            ..Default::default()
        };
        let settings = CalendarSettings::from_config(Some(&config));
        assert_eq!(settings.time_zone, chrono_tz::Asia::Kolkata);
        assert_eq!(settings.week_start, Weekday::Mon);

        let bad = SchedulingConfig {
            time_zone: Some("Mars/Olympus".to_string()),
            week_starts_on: Some("Someday".to_string()),
            ..Default::default()
        };
        assert_eq!(CalendarSettings::from_config(Some(&bad)), CalendarSettings::default());
        assert_eq!(CalendarSettings::from_config(None).week_start, Weekday::Sun);
    }
}
