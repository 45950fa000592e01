use crate::{
    core::{
        bounds::Bounds,
        geo::{LatLng, LatLngBounds, Point},
    },
    Result,
};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// An indexed entry. Geographic items use `x = lng`, `y = lat`.
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub id: String,
    pub bounds: Bounds,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(id: String, bounds: Bounds, data: T) -> Self {
        Self { id, bounds, data }
    }

    pub fn from_point(id: String, point: Point, data: T) -> Self {
        Self::new(id, Bounds::new(point, point), data)
    }

    pub fn from_lat_lng(id: String, lat_lng: LatLng, data: T) -> Self {
        Self::from_point(id, Point::new(lat_lng.lng, lat_lng.lat), data)
    }

    /// Geographic position of a point item
    pub fn lat_lng(&self) -> LatLng {
        let center = self.bounds.center();
        LatLng::new(center.y, center.x)
    }
}

impl<T> PartialEq for SpatialItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for SpatialItem<T> {}

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min.x, self.bounds.min.y],
            [self.bounds.max.x, self.bounds.max.y],
        )
    }
}

impl<T> PointDistance for SpatialItem<T> {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let center = self.bounds.center();
        let dx = center.x - point[0];
        let dy = center.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.bounds.contains(&Point::new(point[0], point[1]))
    }
}

/// R-tree backed index over markers
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
    bounds: Option<Bounds>,
}

impl<T: Clone> SpatialIndex<T> {
    pub fn new() -> Self {
        Self {
            rtree: RTree::new(),
            bounds: None,
        }
    }

    /// Builds a balanced tree in one pass
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        let bounds = items.iter().fold(None::<Bounds>, |acc, item| match acc {
            Some(mut b) => {
                b.extend_bounds(&item.bounds);
                Some(b)
            }
            None => Some(item.bounds.clone()),
        });

        Self {
            rtree: RTree::bulk_load(items),
            bounds,
        }
    }

    pub fn insert(&mut self, item: SpatialItem<T>) -> Result<()> {
        if let Some(ref mut b) = self.bounds {
            b.extend_bounds(&item.bounds);
        } else {
            self.bounds = Some(item.bounds.clone());
        }

        self.rtree.insert(item);
        Ok(())
    }

    pub fn query(&self, bounds: &Bounds) -> Vec<&SpatialItem<T>> {
        let envelope =
            AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y]);
        self.rtree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Items whose position falls inside geographic bounds
    pub fn query_lat_lng(&self, bounds: &LatLngBounds) -> Vec<&SpatialItem<T>> {
        self.query(&Bounds::from_coords(
            bounds.south_west.lng,
            bounds.south_west.lat,
            bounds.north_east.lng,
            bounds.north_east.lat,
        ))
    }

    pub fn nearest(&self, point: &Point) -> Option<&SpatialItem<T>> {
        self.rtree.nearest_neighbor(&[point.x, point.y])
    }

    /// Envelope of everything inserted so far
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn clear(&mut self) {
        self.rtree = RTree::new();
        self.bounds = None;
    }

    pub fn get(&self, id: &str) -> Option<&SpatialItem<T>> {
        self.rtree.iter().find(|item| item.id == id)
    }
}

impl<T: Clone> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SpatialIndex<usize> {
        SpatialIndex::bulk_load(vec![
            SpatialItem::from_lat_lng("antakya".into(), LatLng::new(36.2021, 36.1606), 0),
            SpatialItem::from_lat_lng("gaziantep".into(), LatLng::new(37.0662, 37.3833), 1),
            SpatialItem::from_lat_lng("malatya".into(), LatLng::new(38.3552, 38.3095), 2),
        ])
    }

    #[test]
    fn test_query_lat_lng() {
        let index = index();
        assert_eq!(index.len(), 3);

        let hits = index.query_lat_lng(&LatLngBounds::from_coords(36.0, 36.0, 37.5, 37.5));
        let mut ids: Vec<_> = hits.iter().map(|item| item.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["antakya", "gaziantep"]);
    }

    #[test]
    fn test_bounds_and_lookup() {
        let mut index = index();
        let bounds = index.bounds().unwrap();
        assert_eq!(bounds.min, Point::new(36.1606, 36.2021));
        assert_eq!(bounds.max, Point::new(38.3095, 38.3552));

        assert_eq!(index.get("malatya").map(|item| item.data), Some(2));
        assert_eq!(
            index.get("gaziantep").unwrap().lat_lng(),
            LatLng::new(37.0662, 37.3833)
        );

        index.clear();
        assert!(index.is_empty());
        assert!(index.bounds().is_none());
    }

    #[test]
    fn test_nearest() {
        let index = index();
        let nearest = index.nearest(&Point::new(38.0, 38.0)).unwrap();
        assert_eq!(nearest.id, "malatya");
    }
}
