use mapbox_tile_stitcher::{Fixture, ImageryKind, MAX_ZOOM};

pub fn is_numeric_min(min: u64) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v.parse::<u64>().map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(())
    }
}

pub fn is_latitude(v: String) -> Result<(), String> {
    is_coord_within(v, 90f64)
}

pub fn is_longitude(v: String) -> Result<(), String> {
    is_coord_within(v, 180f64)
}

fn is_coord_within(v: String, limit: f64) -> Result<(), String> {
    let val = v.parse::<f64>().map_err(|_| "must be numeric".to_owned())?;

    if !val.is_finite() {
        return Err("must be a finite number".to_owned());
    } else if val < -limit {
        return Err(format!("must be >= -{}°", limit));
    } else if val > limit {
        return Err(format!("must be <= {}°", limit));
    }

    Ok(())
}

pub fn is_zoom(v: String) -> Result<(), String> {
    let val = v.parse::<u8>().map_err(|_| "must be numeric".to_owned())?;

    if val > MAX_ZOOM {
        return Err(format!("must be <= {}", MAX_ZOOM));
    }

    Ok(())
}

pub fn is_kind(v: String) -> Result<(), String> {
    v.parse::<ImageryKind>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

pub fn is_bb_fixture(v: String) -> Result<(), String> {
    v.parse::<Fixture>()
        .map(|_| ())
        .map_err(|_| "invalid fixture (expected `miami` or `miami-center`)".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates() {
        assert!(is_latitude("-90".into()).is_ok());
        assert!(is_latitude("90.5".into()).is_err());
        assert!(is_longitude("-180".into()).is_ok());
        assert!(is_longitude("180.01".into()).is_err());
        assert!(is_longitude("east".into()).is_err());
        assert!(is_latitude("NaN".into()).is_err());
    }

    #[test]
    fn zoom_and_minimum() {
        assert!(is_zoom("0".into()).is_ok());
        assert!(is_zoom("23".into()).is_err());
        assert!(is_numeric_min(1)("0".into()).is_err());
        assert!(is_numeric_min(0)("0".into()).is_ok());
    }

    #[test]
    fn kinds_and_fixtures() {
        assert!(is_kind("elevation".into()).is_ok());
        assert!(is_kind("streets".into()).is_err());
        assert!(is_bb_fixture("miami".into()).is_ok());
        assert!(is_bb_fixture("usa".into()).is_err());
    }
}
