//! Resistance-to-temperature calibration
//!
//! Thermistor tables list the resistance at each whole degree, starting
//! at a table-specific baseline and decreasing monotonically as the
//! temperature rises. Lookups interpolate linearly between neighbours.

/// Calibration table for one thermistor
#[derive(Debug, Clone, Copy)]
pub struct CalibrationTable {
    /// Temperature of the first entry in °C
    pub baseline_c: i16,
    /// Resistance at `baseline_c + index`, strictly decreasing
    pub resistances: &'static [u32],
}

impl CalibrationTable {
    /// Convert a resistance (in the table's units) to °C
    ///
    /// Resistances at or above the coldest entry return the baseline.
    /// Resistances below the hottest entry saturate at the hottest
    /// tabulated temperature.
    pub fn temperature(&self, resistance: u32) -> f32 {
        let table = self.resistances;
        let Some(i) = table.iter().position(|&r| resistance >= r) else {
            return self.hottest_c();
        };
        if i == 0 {
            return self.baseline_c as f32;
        }

        let high = table[i - 1];
        let low = table[i];
        let fraction = (resistance - low) as f32 / (high - low) as f32;
        (i as i32 + self.baseline_c as i32) as f32 - fraction
    }

    /// Hottest tabulated temperature in °C
    pub fn hottest_c(&self) -> f32 {
        let top = self.resistances.len().saturating_sub(1);
        (self.baseline_c as i32 + top as i32) as f32
    }
}

/// Plate thermistor, 0.1 Ω units, -40 °C to 105 °C
pub const PLATE_TABLE: CalibrationTable = CalibrationTable {
    baseline_c: -40,
    resistances: &PLATE_RESISTANCES,
};

/// Lid thermistor, Ω, 0 °C to 125 °C
pub const LID_TABLE: CalibrationTable = CalibrationTable {
    baseline_c: 0,
    resistances: &LID_RESISTANCES,
};

#[rustfmt::skip]
const PLATE_RESISTANCES: [u32; 146] = [
    3364790, 3149040, 2948480, 2761940, 2588380, 2426810, 2276320, 2136100, 2005390, 1883490,
    1769740, 1663560, 1564410, 1471770, 1385180, 1304210, 1228470, 1157590, 1091220, 1029060,
    970810, 916210, 865010, 816980, 771900, 729570, 689820, 652460, 617360, 584340,
    553290, 524070, 496560, 470660, 446260, 423270, 401590, 381150, 361870, 343680,
    326500, 310290, 294980, 280520, 266850, 253920, 241700, 230130, 219180, 208820,
    199010, 189710, 180900, 172550, 164630, 157120, 149990, 143230, 136810, 130720,
    124930, 119420, 114190, 109220, 104500, 100000, 95720, 91650, 87770, 84080,
    80570, 77220, 74020, 70980, 68080, 65310, 62670, 60150, 57750, 55450,
    53260, 51170, 49170, 47250, 45430, 43680, 42010, 40410, 38880, 37420,
    36020, 34680, 33400, 32170, 30990, 29860, 28780, 27740, 26750, 25790,
    24880, 24000, 23160, 22350, 21570, 20830, 20110, 19420, 18760, 18130,
    17520, 16930, 16370, 15820, 15300, 14800, 14320, 13850, 13400, 12970,
    12550, 12150, 11770, 11400, 11040, 10700, 10370, 10050, 9738, 9441,
    9155, 8878, 8612, 8354, 8106, 7866, 7635, 7412, 7196, 6987,
    6786, 6591, 6403, 6222, 6046, 5876,
];

#[rustfmt::skip]
const LID_RESISTANCES: [u32; 126] = [
    32919, 31270, 29715, 28246, 26858, 25547, 24307, 23135, 22026, 20977,
    19987, 19044, 18154, 17310, 16510, 15752, 15034, 14352, 13705, 13090,
    12507, 11953, 11427, 10927, 10452, 10000, 9570, 9161, 8771, 8401,
    8048, 7712, 7391, 7086, 6795, 6518, 6254, 6001, 5761, 5531,
    5311, 5102, 4902, 4710, 4528, 4353, 4186, 4026, 3874, 3728,
    3588, 3454, 3326, 3203, 3085, 2973, 2865, 2761, 2662, 2567,
    2476, 2388, 2304, 2223, 2146, 2072, 2000, 1932, 1866, 1803,
    1742, 1684, 1627, 1573, 1521, 1471, 1423, 1377, 1332, 1289,
    1248, 1208, 1170, 1133, 1097, 1063, 1030, 998, 968, 938,
    909, 882, 855, 829, 805, 781, 758, 735, 714, 693,
    673, 653, 635, 616, 599, 582, 565, 550, 534, 519,
    505, 491, 478, 465, 452, 440, 428, 416, 405, 395,
    384, 374, 364, 355, 345, 337,
];
