use anyhow::Result;
use chrono::{TimeZone, Utc};
use std::time::{Duration, Instant};

use mapty_lib::form::{parse_number, validate, RestartableTimer};
use mapty_lib::map::{zoom_for_span, MAX_ZOOM, MIN_ZOOM};
use mapty_lib::render::{format_metric, popup_content};
use mapty_lib::{
    render_entry, Bounds, Coords, FormField, FormLayout, MapView, MarkerMap, Popup,
    ValidationError, Workout, WorkoutForm, WorkoutId, WorkoutType,
};

const AT: Coords = Coords::new(40.0, -3.7);

#[test]
fn test_running_pace() {
    let workout = Workout::running(AT, 5.0, 30.0, 170.0, Utc::now());
    assert_eq!(workout.pace(), Some(6.0));
    assert_eq!(workout.speed(), None);
    assert_eq!(workout.derived_metric(), Some(6.0));
    assert_eq!(workout.cadence(), Some(170.0));
    assert_eq!(workout.elevation_gain(), None);
}

#[test]
fn test_cycling_speed_is_km_per_hour() {
    let workout = Workout::cycling(AT, 20.0, 60.0, 300.0, Utc::now());
    assert_eq!(workout.speed(), Some(20.0));

    let workout = Workout::cycling(AT, 30.0, 90.0, 0.0, Utc::now());
    assert_eq!(workout.speed(), Some(20.0));
}

#[test]
fn test_zero_divisor_leaves_metric_unset() {
    assert_eq!(Workout::running(AT, 0.0, 30.0, 170.0, Utc::now()).pace(), None);
    assert_eq!(Workout::cycling(AT, 20.0, 0.0, 10.0, Utc::now()).speed(), None);
    assert_eq!(format_metric(None), "-");
    assert_eq!(format_metric(Some(5.0 / 3.0)), "1.7");
}

#[test]
fn test_id_is_last_ten_timestamp_digits() {
    let created = Utc.timestamp_millis_opt(1_712_345_678_901).unwrap();
    let workout = Workout::running(AT, 1.0, 1.0, 1.0, created);
    assert_eq!(workout.id(), &WorkoutId::from("2345678901"));
    assert_eq!(workout.created_at(), created);
}

#[test]
fn test_apply_edit_recomputes_metric() {
    let mut workout = Workout::cycling(AT, 20.0, 60.0, 300.0, Utc::now());
    workout.apply_edit(45.0, 90.0, 500.0);
    assert_eq!(workout.distance_km(), 45.0);
    assert_eq!(workout.speed(), Some(30.0));
    assert_eq!(workout.elevation_gain(), Some(500.0));
    assert_eq!(workout.workout_type(), WorkoutType::Cycling);
    assert!(workout.description().starts_with("Cycling on "));
}

#[test]
fn test_record_click() {
    let mut workout = Workout::running(AT, 5.0, 30.0, 170.0, Utc::now());
    workout.record_click();
    workout.record_click();
    assert_eq!(workout.click_count(), 2);
}

#[test]
fn test_workout_type_parsing() -> Result<()> {
    assert_eq!(WorkoutType::try_from("Running")?, WorkoutType::Running);
    assert_eq!(WorkoutType::try_from(" bike ")?, WorkoutType::Cycling);
    assert!(WorkoutType::try_from("swimming").is_err());
    assert_eq!(WorkoutType::Cycling.to_string(), "cycling");
    assert_eq!(WorkoutType::Running.toggled(), WorkoutType::Cycling);
    Ok(())
}

#[test]
fn test_coords_validity() {
    assert!(AT.is_valid());
    assert!(!Coords::new(91.0, 0.0).is_valid());
    assert!(!Coords::new(0.0, f64::NAN).is_valid());
    assert_eq!(Coords::from([1.5, 2.5]), Coords::new(1.5, 2.5));
    assert_eq!(AT.to_string(), "40.0000, -3.7000");
}

#[test]
fn test_parse_number() {
    assert_eq!(parse_number("Distance", " 5.5 "), Ok(5.5));
    assert!(matches!(
        parse_number("Distance", ""),
        Err(ValidationError::NotANumber { field: "Distance", .. })
    ));
    assert!(matches!(
        parse_number("Duration", "ten"),
        Err(ValidationError::NotANumber { .. })
    ));
}

#[test]
fn test_validate_rules() {
    assert!(validate(&[("Distance", 0.0), ("Duration", 1.0)]).is_ok());
    assert!(matches!(
        validate(&[("Distance", 5.0), ("Duration", f64::INFINITY)]),
        Err(ValidationError::NotFinite { field: "Duration" })
    ));
    assert!(matches!(
        validate(&[("Distance", -1.0), ("Duration", 1.0)]),
        Err(ValidationError::Negative { field: "Distance", .. })
    ));
    // Finiteness is checked across every field before sign
    assert!(matches!(
        validate(&[("Distance", -1.0), ("Duration", f64::NAN)]),
        Err(ValidationError::NotFinite { .. })
    ));
}

#[test]
fn test_form_toggles_type_specific_field() {
    let mut form = WorkoutForm::default();
    form.show(AT);
    assert!(form.is_field_visible(FormField::Cadence));
    assert!(!form.is_field_visible(FormField::Elevation));

    form.focus(FormField::Cadence);
    form.toggle_fields_for_type();
    assert_eq!(form.workout_type(), WorkoutType::Cycling);
    assert!(form.is_field_visible(FormField::Elevation));
    assert!(!form.is_field_visible(FormField::Cadence));
    assert_eq!(form.focused(), FormField::Elevation);
}

#[test]
fn test_form_focus_cycles_visible_fields() {
    let mut form = WorkoutForm::default();
    form.show(AT);
    assert_eq!(form.focused(), FormField::Distance);
    form.focus_next();
    form.focus_next();
    assert_eq!(form.focused(), FormField::Cadence);
    form.focus_next();
    assert_eq!(form.focused(), FormField::Type);
    form.focus_previous();
    assert_eq!(form.focused(), FormField::Cadence);

    form.focus(FormField::Elevation);
    assert_eq!(form.focused(), FormField::Cadence);
}

#[test]
fn test_form_typing() {
    let mut form = WorkoutForm::default();
    form.show(AT);
    for c in "12.5".chars() {
        form.push_char(c);
    }
    form.backspace();
    assert_eq!(form.value(FormField::Distance), "12.");

    form.focus(FormField::Type);
    form.push_char('9');
    assert_eq!(form.value(FormField::Type), "");
}

#[test]
fn test_form_read_uses_visible_field() -> Result<()> {
    let mut form = WorkoutForm::default();
    form.show(AT);
    form.set_type(WorkoutType::Cycling);
    form.set_value(FormField::Distance, "20");
    form.set_value(FormField::Duration, "60");
    form.set_value(FormField::Cadence, "abc");
    form.set_value(FormField::Elevation, "120");

    let input = form.read()?;
    assert_eq!(input.workout_type, WorkoutType::Cycling);
    assert_eq!(input.type_specific, 120.0);
    Ok(())
}

#[test]
fn test_form_hide_and_restore_timer() {
    let mut form = WorkoutForm::new(Duration::from_millis(1000));
    let start = Instant::now();
    form.show(AT);
    form.set_value(FormField::Distance, "5");
    form.hide(start);

    assert!(form.is_hidden());
    assert_eq!(form.layout(), FormLayout::Collapsed);
    assert_eq!(form.value(FormField::Distance), "");
    assert!(form.restore_pending());
    assert!(!form.tick(start + Duration::from_millis(999)));
    assert!(form.tick(start + Duration::from_millis(1000)));
    assert_eq!(form.layout(), FormLayout::Grid);
    assert!(!form.tick(start + Duration::from_millis(2000)));
}

#[test]
fn test_form_show_cancels_pending_restore() {
    let mut form = WorkoutForm::default();
    let start = Instant::now();
    form.show(AT);
    form.hide(start);
    form.show(AT);

    assert!(!form.restore_pending());
    assert!(form.is_displayed());
    assert!(!form.tick(start + Duration::from_secs(5)));
}

#[test]
fn test_restartable_timer_reschedules() {
    let mut timer = RestartableTimer::default();
    let start = Instant::now();
    timer.schedule(start, Duration::from_millis(100));
    timer.schedule(start + Duration::from_millis(50), Duration::from_millis(100));
    assert!(!timer.fire(start + Duration::from_millis(120)));
    assert!(timer.fire(start + Duration::from_millis(150)));
    assert!(!timer.is_pending());
}

#[test]
fn test_form_prefills_for_edit() {
    let workout = Workout::cycling(AT, 20.0, 60.0, 300.0, Utc::now());
    let mut form = WorkoutForm::default();
    form.show_for_edit(&workout);

    assert!(form.is_type_locked());
    assert_eq!(form.pending(), None);
    assert_eq!(form.workout_type(), WorkoutType::Cycling);
    assert_eq!(form.value(FormField::Distance), "20");
    assert_eq!(form.value(FormField::Elevation), "300");
    form.set_type(WorkoutType::Running);
    assert_eq!(form.workout_type(), WorkoutType::Cycling);
}

#[test]
fn test_render_running_entry() {
    let workout = Workout::running(AT, 5.0, 27.0, 178.0, Utc::now());
    let entry = render_entry(&workout);

    assert_eq!(&entry.id, workout.id());
    assert_eq!(entry.title, workout.description());
    let values: Vec<_> = entry
        .details
        .iter()
        .map(|d| (d.value.as_str(), d.unit))
        .collect();
    assert_eq!(
        values,
        [("5", "km"), ("27", "min"), ("5.4", "min/km"), ("178", "spm")]
    );
    assert_eq!(entry.details[0].icon, WorkoutType::Running.icon());
}

#[test]
fn test_render_cycling_markup() {
    let workout = Workout::cycling(AT, 27.0, 95.0, 523.0, Utc::now());
    let markup = render_entry(&workout).to_markup();

    assert!(markup.starts_with(&format!(
        r#"<li class="workout workout--cycling" data-id="{}">"#,
        workout.id()
    )));
    assert!(markup.contains("17.1"));
    assert!(markup.contains("km/h"));
    assert!(markup.contains(r#"<button class="workout__btn workout__btn--edit">edit</button>"#));
    assert!(markup.contains(r#"<button class="workout__btn workout__btn--delete">delete</button>"#));
    assert!(markup.ends_with("</li>"));
    // Opening tag, title, four detail blocks of five lines, two buttons, closing tag
    assert_eq!(markup.lines().count(), 25);
    assert!(markup.lines().all(|line| !line.is_empty()));
}

#[test]
fn test_popup_content() {
    let workout = Workout::cycling(AT, 27.0, 95.0, 523.0, Utc::now());
    let content = popup_content(&workout);
    assert!(content.starts_with(WorkoutType::Cycling.icon()));
    assert!(content.ends_with(workout.description()));

    let popup = Popup::for_workout(WorkoutType::Cycling, content);
    assert_eq!(popup.class_name, "cycling-popup");
    assert_eq!((popup.min_width, popup.max_width), (200, 250));
    assert!(!popup.auto_close);
    assert!(!popup.close_on_click);
}

#[test]
fn test_bounds_enclosing() {
    assert_eq!(Bounds::enclosing(Vec::new()), None);

    let bounds = Bounds::enclosing([Coords::new(1.0, 5.0), Coords::new(3.0, -1.0)]).unwrap();
    assert_eq!(bounds.south_west, Coords::new(1.0, -1.0));
    assert_eq!(bounds.north_east, Coords::new(3.0, 5.0));
    assert_eq!(bounds.center(), Coords::new(2.0, 2.0));
    assert!(bounds.contains(Coords::new(2.0, 0.0)));
    assert!(!bounds.contains(Coords::new(4.0, 0.0)));
}

#[test]
fn test_zoom_for_span() {
    assert_eq!(zoom_for_span(0.0), MAX_ZOOM);
    assert_eq!(zoom_for_span(360.0), MIN_ZOOM);
    assert_eq!(zoom_for_span(1.0), 8);
}

#[test]
fn test_marker_map() {
    let mut map = MarkerMap::new();
    map.zoom_in();
    assert_eq!(map.view(), None);

    map.set_view(AT, 30);
    assert_eq!(map.view().map(|v| v.zoom), Some(MAX_ZOOM));
    map.zoom_in();
    assert_eq!(map.view().map(|v| v.zoom), Some(MAX_ZOOM));
    map.set_zoom(MIN_ZOOM);
    map.zoom_out();
    assert_eq!(map.view().map(|v| v.zoom), Some(MIN_ZOOM));

    let popup = Popup::for_workout(WorkoutType::Running, "x".to_string());
    let a = map.add_marker(AT, popup.clone());
    let b = map.add_marker(Coords::new(0.0, 0.0), popup);
    assert_ne!(a, b);
    map.remove_marker(a);
    assert_eq!(map.marker_count(), 1);
    assert!(map.marker(b).is_some());

    map.fit_bounds(
        Bounds::enclosing([Coords::new(0.0, 0.0), Coords::new(0.5, 0.5)]).unwrap(),
        0.0,
    );
    let view = map.view().unwrap();
    assert_eq!(view.center, Coords::new(0.25, 0.25));
    assert_eq!(view.zoom, 9);
}
