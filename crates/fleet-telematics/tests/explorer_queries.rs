use fleet_telematics::fleet::{
    paginate, sample, FuelType, Severity, SortColumn, SortDirection, VehicleFilter, VehicleQuery,
    VehicleRecord, VehicleStatus, VehicleType,
};
use std::collections::HashSet;

fn larger_fleet() -> Vec<VehicleRecord> {
    let base = sample::vehicles();
    (0..5)
        .flat_map(|copy| {
            base.iter().cloned().map(move |mut vehicle| {
                vehicle.id = format!("{}-{copy}", vehicle.id);
                vehicle
            })
        })
        .collect()
}

fn collect_pages(query: &mut VehicleQuery, vehicles: &[VehicleRecord]) -> Vec<String> {
    let total_pages = query.run(vehicles).total_pages;
    let mut ids = Vec::new();
    for page in 1..=total_pages {
        query.set_page(page);
        ids.extend(query.run(vehicles).items.iter().map(|vehicle| vehicle.id.clone()));
    }
    ids
}

#[test]
fn pages_cover_the_filtered_sorted_list_exactly_once() {
    let vehicles = larger_fleet();
    assert_eq!(vehicles.len(), 55);

    let filters = [
        VehicleFilter::default(),
        VehicleFilter {
            vehicle_type: Some(VehicleType::Van),
            ..VehicleFilter::default()
        },
        VehicleFilter {
            status: Some(VehicleStatus::Active),
            search: Some("trk".to_string()),
            ..VehicleFilter::default()
        },
    ];

    for filter in filters {
        let mut expected: Vec<&VehicleRecord> = vehicles
            .iter()
            .filter(|vehicle| filter.matches(vehicle))
            .collect();
        fleet_telematics::fleet::query::sort_vehicles(
            &mut expected,
            SortColumn::CostDaily,
            SortDirection::Desc,
        );
        let expected: Vec<String> = expected.iter().map(|vehicle| vehicle.id.clone()).collect();

        let mut query = VehicleQuery::new(filter);
        query.set_sort(SortColumn::CostDaily, SortDirection::Desc);
        let paged = collect_pages(&mut query, &vehicles);

        assert_eq!(paged, expected);
        let unique: HashSet<&String> = paged.iter().collect();
        assert_eq!(unique.len(), paged.len());
    }
}

#[test]
fn filter_changes_return_to_the_first_page() {
    let vehicles = larger_fleet();
    let mut query = VehicleQuery::default();
    query.set_page(3);
    assert_eq!(query.run(&vehicles).page, 3);

    query.set_status(Some(VehicleStatus::Idle));
    assert_eq!(query.page(), 1);

    query.set_page(2);
    query.set_search("car");
    assert_eq!(query.page(), 1);

    let changes: [fn(&mut VehicleQuery); 4] = [
        |q| q.set_vehicle_type(Some(VehicleType::Car)),
        |q| q.set_fuel_type(Some(FuelType::Diesel)),
        |q| q.set_alert_severity(Some(Severity::High)),
        |q| q.clear_filters(),
    ];
    for change in changes {
        query.set_page(2);
        change(&mut query);
        assert_eq!(query.page(), 1);
    }
    assert!(query.filter().is_empty());
}

#[test]
fn out_of_range_pages_clamp_to_the_last_page() {
    let page = paginate((1..=45).collect::<Vec<u32>>(), 9, 20);
    assert_eq!(page.page, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items, vec![41, 42, 43, 44, 45]);

    let empty = paginate(Vec::<u32>::new(), 4, 20);
    assert_eq!(empty.page, 1);
    assert_eq!(empty.total_pages, 1);
    assert!(empty.items.is_empty());
}
