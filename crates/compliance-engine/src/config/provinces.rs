use std::collections::BTreeMap;

/// Latitude/longitude of a province centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProvinceCentroid {
    pub latitude: f64,
    pub longitude: f64,
}

/// Static centroid table keyed by normalized (lowercase) province name.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceCoordinates {
    centroids: BTreeMap<String, ProvinceCentroid>,
    map_center: ProvinceCentroid,
}

impl ProvinceCoordinates {
    pub fn new(
        centroids: impl IntoIterator<Item = (String, ProvinceCentroid)>,
        map_center: ProvinceCentroid,
    ) -> Self {
        Self {
            centroids: centroids.into_iter().collect(),
            map_center,
        }
    }

    pub fn south_africa() -> Self {
        const CENTROIDS: &[(&str, f64, f64)] = &[
            ("gauteng", -26.2708, 28.1123),
            ("kwazulu-natal", -29.8587, 31.0218),
            ("western cape", -33.9249, 18.4241),
            ("eastern cape", -32.2968, 26.4194),
            ("free state", -29.0852, 26.1596),
            ("limpopo", -23.4013, 29.4179),
            ("mpumalanga", -25.5653, 30.5279),
            ("north west", -26.6639, 25.2838),
            ("northern cape", -29.0467, 21.8569),
        ];

        Self::new(
            CENTROIDS.iter().map(|(name, latitude, longitude)| {
                (
                    name.to_string(),
                    ProvinceCentroid {
                        latitude: *latitude,
                        longitude: *longitude,
                    },
                )
            }),
            ProvinceCentroid {
                latitude: -30.5595,
                longitude: 22.9375,
            },
        )
    }

    pub fn get(&self, province: &str) -> Option<ProvinceCentroid> {
        self.centroids.get(province).copied()
    }

    pub fn map_center(&self) -> ProvinceCentroid {
        self.map_center
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }
}
