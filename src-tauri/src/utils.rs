use chrono::{DateTime, NaiveDateTime, Utc};

/// Normaliza una placa: sin espacios alrededor y en mayúsculas
pub fn normalizar_placa(placa: &str) -> String {
    placa.trim().to_uppercase()
}

/// True si la placa contiene el término buscado, sin distinguir mayúsculas
pub fn coincide_placa(placa: &str, termino: &str) -> bool {
    placa.to_uppercase().contains(&termino.trim().to_uppercase())
}

/// Interpreta una fecha del backend: ISO 8601 con zona horaria o "naive"
pub fn parsear_fecha(valor: &str) -> Option<DateTime<Utc>> {
    if let Ok(fecha) = DateTime::parse_from_rfc3339(valor) {
        return Some(fecha.with_timezone(&Utc));
    }
    for formato in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(fecha) = NaiveDateTime::parse_from_str(valor, formato) {
            return Some(fecha.and_utc());
        }
    }
    None
}

/// Milisegundos desde epoch para ordenar eventos; 0 si la fecha no se entiende
pub fn clave_fecha(valor: &str) -> i64 {
    parsear_fecha(valor)
        .map(|fecha| fecha.timestamp_millis())
        .unwrap_or(0)
}

/// Fecha legible para mostrar (10/03/2026 14:30); si no se entiende,
/// se deja tal cual llegó
pub fn formatear_fecha(valor: &str) -> String {
    parsear_fecha(valor)
        .map(|fecha| fecha.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| valor.to_string())
}

/// Duración legible desde la entrada hasta ahora ("2h 15m" o "38m")
pub fn duracion_desde(fecha_entrada: &str) -> String {
    duracion_entre(fecha_entrada, Utc::now())
}

/// Duración legible entre una fecha y un instante de referencia
pub fn duracion_entre(fecha_entrada: &str, hasta: DateTime<Utc>) -> String {
    let Some(entrada) = parsear_fecha(fecha_entrada) else {
        return "-".to_string();
    };
    let minutos = (hasta - entrada).num_minutes().max(0);
    let horas = minutos / 60;
    if horas > 0 {
        format!("{}h {}m", horas, minutos % 60)
    } else {
        format!("{}m", minutos)
    }
}

/// Monto en formato local con separador de miles: $5.000
pub fn formatear_monto(valor: f64) -> String {
    let entero = valor.round() as i64;
    let digitos = entero.abs().to_string();
    let mut agrupado = String::new();
    for (i, c) in digitos.chars().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(c);
    }
    if entero < 0 {
        format!("-${}", agrupado)
    } else {
        format!("${}", agrupado)
    }
}

/// Página `pagina` (base 1) de la lista; con `por_pagina` 0 retorna todo
pub fn paginar<T: Clone>(lista: &[T], pagina: usize, por_pagina: usize) -> Vec<T> {
    if por_pagina == 0 {
        return lista.to_vec();
    }
    let inicio = pagina.saturating_sub(1) * por_pagina;
    lista.iter().skip(inicio).take(por_pagina).cloned().collect()
}

/// Cantidad de páginas que ocupa la lista
pub fn total_paginas(total: usize, por_pagina: usize) -> usize {
    if por_pagina == 0 {
        return 1;
    }
    total.div_ceil(por_pagina).max(1)
}

/// Texto opcional ya recortado; el vacío o solo espacios se vuelve None
pub fn texto_opcional(texto: Option<String>) -> Option<String> {
    texto.and_then(|t| {
        let t = t.trim().to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    })
}
