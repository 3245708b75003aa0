use std::cell::RefCell;
use std::rc::Rc;

use foundation::geo::GeoPoint;
use results::group::Destination;

use crate::highlight::ResultSelection;
use crate::memory::MemorySurface;
use crate::registry::RouteMap;

#[derive(Debug, Default)]
pub struct SelectionLog {
    pub highlighted: Vec<Vec<usize>>,
    pub scrolled: Vec<usize>,
}

impl ResultSelection for SelectionLog {
    fn highlight(&mut self, indices: &[usize]) {
        self.highlighted.push(indices.to_vec());
    }

    fn scroll_into_view(&mut self, index: usize) {
        self.scrolled.push(index);
    }
}

pub fn fixture() -> (RouteMap<MemorySurface>, Rc<RefCell<SelectionLog>>) {
    let log = Rc::new(RefCell::new(SelectionLog::default()));
    let map = RouteMap::new(MemorySurface::new(), Box::new(log.clone()));
    (map, log)
}

pub fn pt(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon)
}

pub fn dest(lat: f64, lon: f64, result_index: usize) -> Destination {
    Destination {
        point: pt(lat, lon),
        label: format!("D{result_index}"),
        result_index,
    }
}
