//! Cart partitioning by seller
//!
//! Pure logic, no I/O. The orchestrator loads the authoritative product rows
//! and hands them in; prices always come from the catalog, never the client.

use std::collections::{BTreeMap, HashMap};

use crate::db::products::Product;
use crate::error::{AppError, ErrorCode};

/// One line of an incoming cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantidade: i64,
}

/// Cart line priced from the catalog.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: i64,
    pub quantidade: i64,
    pub preco_unitario_centavos: i64,
}

impl PricedLine {
    /// None when the amount does not fit in i64 centavos.
    pub fn subtotal_centavos(&self) -> Option<i64> {
        self.quantidade.checked_mul(self.preco_unitario_centavos)
    }
}

/// All of one seller's lines from a cart.
#[derive(Debug, Clone)]
pub struct SellerGroup {
    pub seller_id: i64,
    pub lines: Vec<PricedLine>,
}

impl SellerGroup {
    /// None when the amount does not fit in i64 centavos.
    pub fn subtotal_centavos(&self) -> Option<i64> {
        self.lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.subtotal_centavos()?))
    }
}

/// Partition cart lines into per-seller groups, pricing each line from the
/// product index. A line referencing a product missing from the index fails
/// the whole cart. Groups come back ordered by seller id; within a group,
/// lines keep their cart order.
pub fn split_by_seller(
    lines: &[CartLine],
    products: &HashMap<i64, Product>,
) -> Result<Vec<SellerGroup>, AppError> {
    let mut groups: BTreeMap<i64, Vec<PricedLine>> = BTreeMap::new();

    for line in lines {
        let product = products.get(&line.product_id).ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound).with_detail("productId", line.product_id)
        })?;

        groups.entry(product.seller_id).or_default().push(PricedLine {
            product_id: line.product_id,
            quantidade: line.quantidade,
            preco_unitario_centavos: product.preco_centavos,
        });
    }

    Ok(groups
        .into_iter()
        .map(|(seller_id, lines)| SellerGroup { seller_id, lines })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, seller_id: i64, preco_centavos: i64) -> Product {
        Product {
            id,
            seller_id,
            nome: format!("Produto {id}"),
            descricao: None,
            preco_centavos,
            unidade_medida: "kg".into(),
            estoque: Some(100),
            imagem_url: None,
            categoria: None,
            ativo: true,
            criado_em: 0,
        }
    }

    fn index(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn test_single_seller_single_group() {
        let products = index(vec![product(1, 10, 500), product(2, 10, 300)]);
        let lines = vec![
            CartLine {
                product_id: 1,
                quantidade: 2,
            },
            CartLine {
                product_id: 2,
                quantidade: 1,
            },
        ];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].seller_id, 10);
        assert_eq!(groups[0].lines.len(), 2);
        assert_eq!(groups[0].subtotal_centavos(), Some(2 * 500 + 300));
    }

    #[test]
    fn test_three_sellers_three_groups() {
        let products = index(vec![
            product(1, 30, 100),
            product(2, 10, 200),
            product(3, 20, 300),
        ]);
        let lines = vec![
            CartLine {
                product_id: 1,
                quantidade: 1,
            },
            CartLine {
                product_id: 2,
                quantidade: 1,
            },
            CartLine {
                product_id: 3,
                quantidade: 1,
            },
        ];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups.len(), 3);
        // Ordered by seller id regardless of cart order
        assert_eq!(groups[0].seller_id, 10);
        assert_eq!(groups[1].seller_id, 20);
        assert_eq!(groups[2].seller_id, 30);
    }

    #[test]
    fn test_prices_come_from_catalog() {
        let products = index(vec![product(1, 10, 750)]);
        let lines = vec![CartLine {
            product_id: 1,
            quantidade: 3,
        }];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups[0].lines[0].preco_unitario_centavos, 750);
        assert_eq!(groups[0].subtotal_centavos(), Some(2250));
    }

    #[test]
    fn test_unknown_product_fails_whole_cart() {
        let products = index(vec![product(1, 10, 500)]);
        let lines = vec![
            CartLine {
                product_id: 1,
                quantidade: 1,
            },
            CartLine {
                product_id: 999,
                quantidade: 1,
            },
        ];

        let err = split_by_seller(&lines, &products).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
        assert_eq!(err.details.unwrap().get("productId").unwrap(), 999);
    }

    #[test]
    fn test_empty_cart_yields_no_groups() {
        let groups = split_by_seller(&[], &HashMap::new()).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_duplicate_product_lines_kept_separate() {
        let products = index(vec![product(1, 10, 500)]);
        let lines = vec![
            CartLine {
                product_id: 1,
                quantidade: 2,
            },
            CartLine {
                product_id: 1,
                quantidade: 3,
            },
        ];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups[0].lines.len(), 2);
        assert_eq!(groups[0].subtotal_centavos(), Some(5 * 500));
    }

    #[test]
    fn test_overflowing_subtotal_detected() {
        let products = index(vec![product(1, 10, 1000)]);
        let lines = vec![CartLine {
            product_id: 1,
            quantidade: i64::MAX / 2,
        }];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups[0].lines[0].subtotal_centavos(), None);
        assert_eq!(groups[0].subtotal_centavos(), None);
    }

    #[test]
    fn test_overflowing_group_sum_detected() {
        let products = index(vec![product(1, 10, i64::MAX), product(2, 10, i64::MAX)]);
        let lines = vec![
            CartLine {
                product_id: 1,
                quantidade: 1,
            },
            CartLine {
                product_id: 2,
                quantidade: 1,
            },
        ];

        let groups = split_by_seller(&lines, &products).unwrap();
        assert_eq!(groups[0].subtotal_centavos(), None);
    }
}
