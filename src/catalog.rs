//! Static product-group catalog shipped with the client.
//!
//! Display names, material numbers and default with-tax prices for the
//! printed price sheet, independent of the live API. Grouping mirrors the
//! desired inventory layout; `material_no` maps to the backend inventory
//! tab.

/// One sellable product as it appears on the printed price sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogProduct {
    pub default_price: f64,
    pub display_name: &'static str,
    pub material_no: &'static str,
}

/// A display grouping on the price sheet.
#[derive(Debug, Clone, Copy)]
pub struct ProductGroup {
    pub products: &'static [CatalogProduct],
}

const fn entry(display_name: &'static str, material_no: &'static str, default_price: f64) -> CatalogProduct {
    CatalogProduct {
        default_price,
        display_name,
        material_no,
    }
}

pub const PRODUCT_GROUPS: &[ProductGroup] = &[
    ProductGroup {
        products: &[
            entry("Equine Senior®", "3006848-506", 29.25),
            entry("Equine Senior® Active", "3006849-506", 31.25),
        ],
    },
    ProductGroup {
        products: &[
            entry("Strategy® Professional Formula GX", "3004620-206", 25.50),
            entry("Strategy® Healthy Edge®", "3004621-506", 25.50),
        ],
    },
    ProductGroup {
        products: &[
            entry("Ultium® Gastric Care", "3004519-506", 33.75),
            entry("Ultium® Growth", "3005651-506", 34.50),
            entry("Ultium® Competition", "3005650-506", 34.50),
            entry("Ultium® Senior", "300492", 34.00),
        ],
    },
    ProductGroup {
        products: &[
            entry("Impact® Professional Senior", "3004514-206", 24.25),
            entry("Impact® Professional Mare & Foal", "3004512-206", 24.50),
            entry("Impact® Professional Performance", "3006066-206", 26.50),
            entry("Impact® All Stages 12% Textured", "3004502-506", 20.00),
            entry("Impact® All Stages 12% Pelleted", "3004501-206", 20.00),
            entry("Impact® Hay Stretcher", "3004507-206", 17.50),
        ],
    },
    ProductGroup {
        products: &[
            entry("Omolene® #200 Performance", "3006181-506", 27.00),
            entry("Omolene® #300 Mare & Foal", "3006182-506", 27.00),
            entry("Omolene® #400 Complete Advantage®", "3006183-506", 27.00),
        ],
    },
    ProductGroup {
        products: &[
            entry("WellSolve L/S", "66924", 39.00),
            entry("Mini-Horse and Pony", "3007261-506", 27.50),
        ],
    },
    ProductGroup {
        products: &[entry("Country Acres 12%", "3009502-206", 12.00)],
    },
    ProductGroup {
        products: &[
            entry("Enrich Plus® Ration Balancing", "3002564-206", 38.00),
            entry("Omega Match® Ration Balancing", "3005939-205", 46.00),
            entry("Omega Match® Ahiflower® Oil Supplement", "3005953-946-EA", 40.00),
            entry("Systemiq® Probiotic Supplement", "3009564-246-EA", 63.00),
            entry("Free Balance 12-12 Support", "3002464-103", 38.50),
        ],
    },
    ProductGroup {
        products: &[
            entry("RepleniMash® - 7LB", "3006758-146-EA", 13.50),
            entry("RepleniMash® - 25 LB", "3006758-103", 38.00),
            entry("Amplify® High-Fat Horse Supplement", "3004870-706", 64.00),
            entry("Outlast® Gastric Support Supplement", "3004500-205", 45.50),
            entry("SuperSport® Amino Acid Supplement", "3002910-203", 50.25),
        ],
    },
    ProductGroup {
        products: &[
            entry("EquiTub® with ClariFly® - 55LB", "3005401-617", 75.00),
            entry("EquiTub® with ClariFly® - 125LB", "3005401-627", 155.00),
        ],
    },
    ProductGroup {
        products: &[
            entry("Mare’s Match® Foal Milk Replacer", "MARES-MATCH-MLK", 80.00),
            entry("Mare’s Match® Transition Pellets - 25LB", "MARES-MATCH-PLT", 57.00),
        ],
    },
    ProductGroup {
        products: &[
            entry("Nicker Makers® Horse Treats", "3003256-746-EA", 6.50),
            entry("Outlast® Horse Treats", "3005457-746-EA", 8.50),
        ],
    },
];

/// All catalog products in display order.
pub fn all_products() -> impl Iterator<Item = &'static CatalogProduct> {
    PRODUCT_GROUPS.iter().flat_map(|g| g.products.iter())
}
